//! Vegetation index band algebra
//!
//! NDVI-style normalized difference between two spectral bands, plus the
//! scaling that turns the [-1, 1] ratio into an 8-bit intensity raster.

use ndarray::Array2;
use rayon::prelude::*;

use cropsense_core::raster::{Raster, RasterElement};
use cropsense_core::{Error, Result};

/// Normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// Result is in [-1, 1]. Pixels where either band is nodata, or where the
/// sum is effectively zero, are set to NaN.
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    let (rows, cols) = band_a.shape();
    if band_a.is_empty() {
        return Err(Error::EmptyRaster);
    }
    if band_b.shape() != (rows, cols) {
        return Err(Error::SizeMismatch {
            expected_rows: rows,
            expected_cols: cols,
            actual_rows: band_b.rows(),
            actual_cols: band_b.cols(),
        });
    }

    let nodata_a = band_a.nodata();
    let nodata_b = band_b.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let a = unsafe { band_a.get_unchecked(row, col) };
                let b = unsafe { band_b.get_unchecked(row, col) };

                if a.is_nodata(nodata_a) || b.is_nodata(nodata_b) {
                    continue;
                }

                let sum = a + b;
                if sum.abs() < 1e-10 {
                    continue;
                }
                row_data[col] = (a - b) / sum;
            }
            row_data
        })
        .collect();

    let mut output = band_a.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

/// Scale an index raster into 8-bit intensities: `round(v * 255)` clamped
/// to [0, 255].
///
/// Negative index values (water, clouds) clamp to 0. NaN cells also map to
/// 0, matching the byte conversion the export path applies.
pub fn scale_index_u8(index: &Raster<f64>) -> Result<Raster<u8>> {
    if index.is_empty() {
        return Err(Error::EmptyRaster);
    }
    let (rows, cols) = index.shape();

    let data: Vec<u8> = index
        .data()
        .iter()
        .map(|&v| u8::saturate_from_f64(v * 255.0))
        .collect();

    let mut output = index.with_same_meta::<u8>(rows, cols);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

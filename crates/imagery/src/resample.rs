//! Clip and resample a scene band to the analysis grid
//!
//! The exported grid is a square region around the analyzed point at a
//! fixed metric ground sampling distance. Source pixels are looked up by
//! nearest neighbor through the band's geotransform.

use cropsense_core::{GeoTransform, Raster};

use crate::error::{ImageryError, Result};
use crate::provider::{BBox, GeoPoint};

/// Clip `band` to `region` and resample it at `gsd_m` meters per pixel.
///
/// The output grid is anchored at the region's north-west corner; cells
/// falling outside the source raster become NaN. Fails when the region and
/// the band do not overlap at all, or when the output grid would be empty.
pub fn clip_resample(
    band: &Raster<f64>,
    point: GeoPoint,
    region: BBox,
    gsd_m: f64,
) -> Result<Raster<f64>> {
    let (src_rows, src_cols) = band.shape();
    if band.is_empty() {
        return Err(ImageryError::Decode(cropsense_core::Error::EmptyRaster));
    }

    let (min_x, min_y, max_x, max_y) = band.bounds();
    let src_bbox = BBox {
        west: min_x,
        south: min_y,
        east: max_x,
        north: max_y,
    };
    if !src_bbox.intersects(&region) {
        return Err(ImageryError::RegionOutsideScene);
    }

    let (px_lon, px_lat) = point.pixel_degrees(gsd_m);
    let out_cols = ((region.east - region.west) / px_lon).round() as usize;
    let out_rows = ((region.north - region.south) / px_lat).round() as usize;
    if out_rows == 0 || out_cols == 0 {
        return Err(ImageryError::Decode(cropsense_core::Error::EmptyRaster));
    }

    let mut output: Raster<f64> = Raster::new(out_rows, out_cols);
    output.set_transform(GeoTransform::new(region.west, region.north, px_lon, -px_lat));
    output.set_nodata(Some(f64::NAN));

    for row in 0..out_rows {
        for col in 0..out_cols {
            let x = region.west + (col as f64 + 0.5) * px_lon;
            let y = region.north - (row as f64 + 0.5) * px_lat;
            let (src_col, src_row) = band.geo_to_pixel(x, y);
            let (sc, sr) = (src_col.floor(), src_row.floor());

            let value = if sc >= 0.0
                && sr >= 0.0
                && (sc as usize) < src_cols
                && (sr as usize) < src_rows
            {
                unsafe { band.get_unchecked(sr as usize, sc as usize) }
            } else {
                f64::NAN
            };
            // Indices are in range by construction of the output grid.
            output.set(row, col, value).map_err(ImageryError::Decode)?;
        }
    }

    Ok(output)
}

//! Edge and texture filters over intensity rasters
//!
//! Building blocks of the pest-detection fusion:
//! - two-threshold edge map (Sobel gradient magnitude + hysteresis)
//! - absolute Laplacian response saturated to 8 bits
//! - weighted fusion of two 8-bit maps
//!
//! All filters treat the one-pixel border as zero response and produce an
//! all-zero map for rasters too small to hold a 3x3 window, so a uniform or
//! degenerate input always yields zero density downstream.

use ndarray::Array2;
use rayon::prelude::*;

use cropsense_core::raster::{Raster, RasterElement};
use cropsense_core::{Error, Result};

/// Thresholds for the two-threshold edge filter.
#[derive(Debug, Clone, Copy)]
pub struct EdgeParams {
    /// Gradient magnitudes below this are discarded.
    pub low_threshold: f64,
    /// Magnitudes at or above this are strong edges.
    pub high_threshold: f64,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
        }
    }
}

/// Sobel gradient magnitude of an 8-bit raster.
///
/// `G = sqrt(Gx² + Gy²)` with the classic 3x3 kernels; border pixels get
/// zero magnitude.
fn sobel_magnitude(raster: &Raster<u8>) -> Vec<f64> {
    let (rows, cols) = raster.shape();
    if rows < 3 || cols < 3 {
        return vec![0.0; rows * cols];
    }

    (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0f64; cols];
            if row == 0 || row == rows - 1 {
                return row_data;
            }
            for col in 1..(cols - 1) {
                let z = |r: usize, c: usize| -> f64 {
                    unsafe { raster.get_unchecked(r, c) as f64 }
                };

                let z1 = z(row - 1, col - 1);
                let z2 = z(row - 1, col);
                let z3 = z(row - 1, col + 1);
                let z4 = z(row, col - 1);
                let z6 = z(row, col + 1);
                let z7 = z(row + 1, col - 1);
                let z8 = z(row + 1, col);
                let z9 = z(row + 1, col + 1);

                let gx = (z3 + 2.0 * z6 + z9) - (z1 + 2.0 * z4 + z7);
                let gy = (z7 + 2.0 * z8 + z9) - (z1 + 2.0 * z2 + z3);

                row_data[col] = (gx * gx + gy * gy).sqrt();
            }
            row_data
        })
        .collect()
}

/// Two-threshold edge map.
///
/// Pixels whose gradient magnitude reaches `high_threshold` are strong
/// edges (255). Pixels between the thresholds are kept only when
/// 8-connected to a strong pixel (hysteresis); everything else is 0.
pub fn edge_map(raster: &Raster<u8>, params: EdgeParams) -> Result<Raster<u8>> {
    if raster.is_empty() {
        return Err(Error::EmptyRaster);
    }
    let (rows, cols) = raster.shape();
    let magnitude = sobel_magnitude(raster);

    // 0 = none, 1 = weak, 2 = strong
    let mut labels: Vec<u8> = magnitude
        .iter()
        .map(|&m| {
            if m >= params.high_threshold {
                2
            } else if m >= params.low_threshold {
                1
            } else {
                0
            }
        })
        .collect();

    // Promote weak pixels connected to strong ones.
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            if labels[row * cols + col] == 2 {
                stack.push((row, col));
            }
        }
    }
    while let Some((row, col)) = stack.pop() {
        for dr in -1i64..=1 {
            for dc in -1i64..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let (nr, nc) = (row as i64 + dr, col as i64 + dc);
                if nr < 0 || nc < 0 || nr >= rows as i64 || nc >= cols as i64 {
                    continue;
                }
                let idx = nr as usize * cols + nc as usize;
                if labels[idx] == 1 {
                    labels[idx] = 2;
                    stack.push((nr as usize, nc as usize));
                }
            }
        }
    }

    let data: Vec<u8> = labels
        .into_iter()
        .map(|l| if l == 2 { 255 } else { 0 })
        .collect();

    let mut output = raster.with_same_meta::<u8>(rows, cols);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

/// Absolute Laplacian response saturated to 8 bits.
///
/// Applies the 4-neighbor kernel
/// ```text
///  0  1  0
///  1 -4  1
///  0  1  0
/// ```
/// and takes `|response|`, clamped at 255.
pub fn laplacian_abs(raster: &Raster<u8>) -> Result<Raster<u8>> {
    if raster.is_empty() {
        return Err(Error::EmptyRaster);
    }
    let (rows, cols) = raster.shape();

    let data: Vec<u8> = if rows < 3 || cols < 3 {
        vec![0u8; rows * cols]
    } else {
        (0..rows)
            .into_par_iter()
            .flat_map(|row| {
                let mut row_data = vec![0u8; cols];
                if row == 0 || row == rows - 1 {
                    return row_data;
                }
                for col in 1..(cols - 1) {
                    let center = unsafe { raster.get_unchecked(row, col) as f64 };
                    let top = unsafe { raster.get_unchecked(row - 1, col) as f64 };
                    let bottom = unsafe { raster.get_unchecked(row + 1, col) as f64 };
                    let left = unsafe { raster.get_unchecked(row, col - 1) as f64 };
                    let right = unsafe { raster.get_unchecked(row, col + 1) as f64 };

                    let response = top + bottom + left + right - 4.0 * center;
                    row_data[col] = u8::saturate_from_f64(response.abs());
                }
                row_data
            })
            .collect()
    };

    let mut output = raster.with_same_meta::<u8>(rows, cols);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

/// Weighted per-pixel fusion of two 8-bit maps:
///
/// `fused = weight_a * a + weight_b * b`, rounded and saturated to [0, 255].
pub fn fuse_weighted(
    a: &Raster<u8>,
    b: &Raster<u8>,
    weight_a: f64,
    weight_b: f64,
) -> Result<Raster<u8>> {
    let (rows, cols) = a.shape();
    if b.shape() != (rows, cols) {
        return Err(Error::SizeMismatch {
            expected_rows: rows,
            expected_cols: cols,
            actual_rows: b.rows(),
            actual_cols: b.cols(),
        });
    }

    let data: Vec<u8> = a
        .data()
        .iter()
        .zip(b.data().iter())
        .map(|(&va, &vb)| u8::saturate_from_f64(weight_a * va as f64 + weight_b * vb as f64))
        .collect();

    let mut output = a.with_same_meta::<u8>(rows, cols);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

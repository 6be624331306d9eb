//! Error types for core raster operations

use thiserror::Error;

/// Main error type for raster operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid raster dimensions: {cols}x{rows}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("raster is empty")]
    EmptyRaster,

    #[error("index out of bounds: ({row}, {col}) in raster of {rows}x{cols}")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("raster size mismatch: expected {expected_rows}x{expected_cols}, got {actual_rows}x{actual_cols}")]
    SizeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    #[error("TIFF decode error: {0}")]
    Decode(String),

    #[error("unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    #[error("{0}")]
    Other(String),
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

//! # CropSense Core
//!
//! Shared raster types and I/O for the CropSense analysis pipeline:
//!
//! - `Raster<T>`: 2-D grid of cell values with georeferencing metadata
//! - `GeoTransform`: affine pixel/geographic coordinate mapping
//! - `RasterElement`: numeric bound for cell types
//! - In-memory GeoTIFF decoding for exported imagery bytes

pub mod error;
pub mod io;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};

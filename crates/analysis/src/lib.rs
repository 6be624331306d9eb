//! # CropSense Analysis
//!
//! Raster analysis for the per-point pipeline:
//!
//! - **index**: normalized-difference vegetation index and 8-bit scaling
//! - **filters**: edge and Laplacian texture responses over intensity rasters
//! - **detector**: edge/Laplacian fusion, stress density and three-tier
//!   health classification

pub mod detector;
pub mod filters;
pub mod index;

pub use detector::{detect, DetectorParams, HealthStatus, PestDetection, PestDetectionResult};
pub use filters::{edge_map, fuse_weighted, laplacian_abs, EdgeParams};
pub use index::{normalized_difference, scale_index_u8};

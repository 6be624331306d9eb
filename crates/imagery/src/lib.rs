//! # CropSense Imagery
//!
//! Acquisition of multispectral satellite imagery for the analysis
//! pipeline. The [`ImageryProvider`] trait exposes exactly two operations:
//! selecting the least-cloudy scene over a point and date range
//! ([`ImageryProvider::acquire`]) and exporting its NIR/RED bands clipped
//! and resampled to a fixed grid ([`ImageryProvider::export`]).
//!
//! Two backends are provided:
//! - [`StacProvider`]: a STAC Item Search catalog over HTTP, with bounded
//!   retries and per-request timeouts
//! - [`MemoryProvider`]: in-process scenes for tests and offline use

pub mod client;
pub mod error;
pub mod memory;
pub mod provider;
pub mod resample;
mod stac;

pub use client::{StacCatalog, StacProvider, StacProviderOptions};
pub use error::{ImageryError, Result};
pub use memory::{MemoryProvider, MemoryScene};
pub use provider::{
    BBox, DateRange, GeoPoint, ImageryProvider, SceneBands, SceneRef, BUFFER_RADIUS_M,
    GROUND_SAMPLING_M,
};

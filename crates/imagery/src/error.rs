//! Error types for imagery acquisition

use thiserror::Error;

/// Errors produced while acquiring or exporting imagery.
#[derive(Error, Debug)]
pub enum ImageryError {
    /// The catalog returned no scenes for the given point and date range.
    #[error("no imagery available for {datetime}")]
    NoImagery { datetime: String },

    /// Network or service failure during search or band download,
    /// including timeouts.
    #[error("imagery download failed: {0}")]
    Download(String),

    /// The selected scene does not expose a required band asset.
    #[error("scene '{scene}' has no '{band}' band asset")]
    MissingBand { scene: String, band: String },

    /// The downloaded bytes could not be decoded into a raster, or the
    /// decoded grid was empty.
    #[error("raster decode failed: {0}")]
    Decode(#[from] cropsense_core::Error),

    /// The export region does not intersect the scene.
    #[error("export region does not intersect scene raster")]
    RegionOutsideScene,

    /// Unknown scene handle passed to `export`.
    #[error("unknown scene: {0}")]
    UnknownScene(String),
}

/// Result alias for imagery operations.
pub type Result<T> = std::result::Result<T, ImageryError>;

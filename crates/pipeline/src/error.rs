//! Pipeline error taxonomy
//!
//! Every failure the pipeline can surface maps onto one of four caller-facing
//! categories; anything else is a programming error reported as `Internal`.

use thiserror::Error;

use cropsense_imagery::ImageryError;

/// Errors surfaced by the analysis pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The request failed validation before any external call.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The catalog has no scene for the requested point and date range.
    #[error("no imagery available: {0}")]
    NoImagery(String),

    /// Scene search or band download failed (network, service, timeout).
    #[error("imagery download failed: {0}")]
    DownloadFailed(String),

    /// The exported data could not be turned into a usable raster.
    #[error("invalid raster: {0}")]
    InvalidRaster(String),

    /// Unexpected internal failure on a valid raster.
    #[error("internal pipeline error: {0}")]
    Internal(String),
}

impl From<ImageryError> for PipelineError {
    fn from(err: ImageryError) -> Self {
        match err {
            ImageryError::NoImagery { datetime } => Self::NoImagery(datetime),
            ImageryError::Download(msg) => Self::DownloadFailed(msg),
            ImageryError::MissingBand { .. } | ImageryError::UnknownScene(_) => {
                Self::DownloadFailed(err.to_string())
            }
            ImageryError::Decode(_) | ImageryError::RegionOutsideScene => {
                Self::InvalidRaster(err.to_string())
            }
        }
    }
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imagery_errors_map_to_taxonomy() {
        let err: PipelineError = ImageryError::NoImagery {
            datetime: "2099-01-01/2099-12-31".into(),
        }
        .into();
        assert!(matches!(err, PipelineError::NoImagery(_)));

        let err: PipelineError = ImageryError::Download("timeout".into()).into();
        assert!(matches!(err, PipelineError::DownloadFailed(_)));

        let err: PipelineError = ImageryError::RegionOutsideScene.into();
        assert!(matches!(err, PipelineError::InvalidRaster(_)));

        let err: PipelineError = ImageryError::UnknownScene("x".into()).into();
        assert!(matches!(err, PipelineError::DownloadFailed(_)));
    }
}

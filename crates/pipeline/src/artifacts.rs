//! On-disk artifact persistence

use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat};
use tracing::debug;

use cropsense_core::raster::Raster;

use crate::error::{PipelineError, Result};
use crate::request::AnalysisRequest;

/// Writes fused detection maps as grayscale PNGs under a fixed directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist the fused map for `request`, returning the written path.
    ///
    /// The filename encodes the full request, so repeated analyses of the
    /// same point over different date windows never overwrite each other.
    pub fn write_fused(&self, request: &AnalysisRequest, fused: &Raster<u8>) -> Result<PathBuf> {
        let (rows, cols) = fused.shape();
        let pixels: Vec<u8> = fused.data().iter().copied().collect();
        let img = GrayImage::from_raw(cols as u32, rows as u32, pixels).ok_or_else(|| {
            PipelineError::Internal("fused raster does not match its dimensions".into())
        })?;

        fs::create_dir_all(&self.dir)
            .map_err(|e| PipelineError::Internal(format!("creating artifact dir: {e}")))?;

        let path = self.dir.join(request.artifact_file_name());
        img.save_with_format(&path, ImageFormat::Png)
            .map_err(|e| PipelineError::Internal(format!("writing artifact: {e}")))?;

        debug!(path = %path.display(), "fused map written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn temp_store(tag: &str) -> ArtifactStore {
        let dir = std::env::temp_dir().join(format!("cropsense-artifacts-{tag}-{}", std::process::id()));
        ArtifactStore::new(dir)
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest::new(
            4.5,
            -74.1,
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn writes_decodable_png() {
        let store = temp_store("png");
        let fused = Raster::filled(16, 16, 200u8);
        let path = store.write_fused(&request(), &fused).unwrap();

        assert!(path.ends_with("pest_4.5_-74.1_2021-01-01_2021-12-31.png"));
        let decoded = image::open(&path).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (16, 16));
        assert_eq!(decoded.get_pixel(8, 8).0[0], 200);

        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn rewrite_same_request_overwrites() {
        let store = temp_store("overwrite");
        let r = request();
        let first = store.write_fused(&r, &Raster::filled(4, 4, 10u8)).unwrap();
        let second = store.write_fused(&r, &Raster::filled(4, 4, 20u8)).unwrap();
        assert_eq!(first, second);

        let decoded = image::open(&second).unwrap().to_luma8();
        assert_eq!(decoded.get_pixel(0, 0).0[0], 20);

        fs::remove_dir_all(store.dir()).unwrap();
    }
}

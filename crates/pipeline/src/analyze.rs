//! Pipeline orchestration
//!
//! `analyze` runs the whole chain for one request: validate, acquire the
//! least-cloudy scene, export bands, compute and scale the index, render
//! the figure, run the detector, persist the fused map and record the
//! result. Each stage failure maps onto the pipeline error taxonomy.

use std::path::PathBuf;

use tracing::{debug, info};

use cropsense_analysis::{
    detect, normalized_difference, scale_index_u8, DetectorParams, PestDetectionResult,
};
use cropsense_colormap::{render_figure, ColorScheme, ColormapParams, VisualizationArtifact};
use cropsense_imagery::{ImageryProvider, BUFFER_RADIUS_M, GROUND_SAMPLING_M};

use crate::artifacts::ArtifactStore;
use crate::error::{PipelineError, Result};
use crate::request::AnalysisRequest;
use crate::store::ResultStore;

/// Pipeline-wide configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Export buffer radius around the point, meters.
    pub buffer_radius_m: f64,
    /// Export ground sampling distance, meters per pixel.
    pub gsd_m: f64,
    /// Detector tuning constants.
    pub detector: DetectorParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_radius_m: BUFFER_RADIUS_M,
            gsd_m: GROUND_SAMPLING_M,
            detector: DetectorParams::default(),
        }
    }
}

/// Everything one analysis produces.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// The rendered index figure (panel, colorbar, title), PNG-encoded.
    pub visualization: VisualizationArtifact,
    /// Where the fused detection map was written.
    pub artifact_path: PathBuf,
    /// Classification and percentages.
    pub detection: PestDetectionResult,
}

/// Run the full analysis for one request.
pub async fn analyze<P: ImageryProvider>(
    provider: &P,
    results: &ResultStore,
    artifacts: &ArtifactStore,
    config: &PipelineConfig,
    request: &AnalysisRequest,
) -> Result<AnalysisOutcome> {
    request.validate()?;
    let point = request.point();
    let range = request.range();

    info!(
        lat = request.latitude,
        lon = request.longitude,
        range = %range.as_interval(),
        "starting analysis"
    );

    let scene = provider.acquire(point, range).await?;
    debug!(scene = %scene.id, cloud_cover = ?scene.cloud_cover, "scene acquired");

    let region = point.buffer_bbox(config.buffer_radius_m);
    let bands = provider.export(&scene, point, region, config.gsd_m).await?;

    let index = normalized_difference(&bands.nir, &bands.red)
        .map_err(|e| PipelineError::InvalidRaster(e.to_string()))?;
    let scaled = scale_index_u8(&index)
        .map_err(|e| PipelineError::InvalidRaster(e.to_string()))?;

    let title = format!("NDVI {}, {}", request.latitude, request.longitude);
    let params = ColormapParams::byte_scaled(ColorScheme::RedYellowGreen);
    let visualization = render_figure(&scaled, &params, &title)
        .map_err(|e| PipelineError::Internal(e.to_string()))?;

    let detection = detect(
        &scaled,
        request.latitude,
        request.longitude,
        &config.detector,
    )
    .map_err(|e| PipelineError::Internal(e.to_string()))?;

    let artifact_path = artifacts.write_fused(request, &detection.fused)?;
    results.put(request.key(), detection.result.clone(), artifact_path.clone());

    info!(
        status = %detection.result.status,
        diseased_pct = detection.result.diseased_area_pct,
        "analysis complete"
    );

    Ok(AnalysisOutcome {
        visualization,
        artifact_path,
        detection: detection.result,
    })
}

//! Pest/stress detection over a scaled vegetation index raster
//!
//! Fuses an edge map and a Laplacian texture response, counts pixels above
//! an affected cutoff, and classifies the resulting density into a
//! three-tier health status. The detector is a pure function of the raster;
//! persisting the fused map is the caller's concern.

use serde::Serialize;

use cropsense_core::raster::Raster;
use cropsense_core::Result;

use crate::filters::{edge_map, fuse_weighted, laplacian_abs, EdgeParams};

/// Tuning constants for the fusion and classification.
///
/// The defaults are the empirically tuned values of the production system;
/// they are parameters, not derived quantities.
#[derive(Debug, Clone, Copy)]
pub struct DetectorParams {
    /// Two-threshold edge filter configuration.
    pub edge: EdgeParams,
    /// Weight of the edge map in the fusion.
    pub edge_weight: f64,
    /// Weight of the Laplacian map in the fusion.
    pub laplacian_weight: f64,
    /// A pixel is affected iff its fused value exceeds this.
    pub affected_cutoff: u8,
    /// Densities below this are Healthy.
    pub healthy_below: f64,
    /// Densities below this (and not Healthy) are Moderate.
    pub moderate_below: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            edge: EdgeParams::default(),
            edge_weight: 0.7,
            laplacian_weight: 0.3,
            affected_cutoff: 100,
            healthy_below: 10.0,
            moderate_below: 30.0,
        }
    }
}

/// Three-tier health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum HealthStatus {
    Healthy,
    Moderate,
    Diseased,
}

impl HealthStatus {
    /// Display color associated with the tier.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Healthy => "green",
            Self::Moderate => "yellow",
            Self::Diseased => "red",
        }
    }

    /// Classify a density percentage. Boundaries belong to the higher tier:
    /// 10.0 is Moderate, 30.0 is Diseased.
    pub fn classify(density: f64, params: &DetectorParams) -> Self {
        if density < params.healthy_below {
            Self::Healthy
        } else if density < params.moderate_below {
            Self::Moderate
        } else {
            Self::Diseased
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Healthy => "Healthy",
            Self::Moderate => "Moderate",
            Self::Diseased => "Diseased",
        };
        f.write_str(s)
    }
}

/// Quantitative detection outcome for one analyzed point.
#[derive(Debug, Clone, Serialize)]
pub struct PestDetectionResult {
    pub latitude: f64,
    pub longitude: f64,
    /// Percentage of affected pixels, in [0, 100].
    pub diseased_area_pct: f64,
    /// Always exactly `100 - diseased_area_pct`.
    pub healthy_area_pct: f64,
    pub status: HealthStatus,
    pub status_color: &'static str,
}

impl PestDetectionResult {
    /// Copy with percentages rounded to two decimals, keeping the exact
    /// complement. This is the shape exported to presentation layers.
    pub fn rounded(&self) -> Self {
        let diseased = (self.diseased_area_pct * 100.0).round() / 100.0;
        Self {
            diseased_area_pct: diseased,
            healthy_area_pct: 100.0 - diseased,
            ..self.clone()
        }
    }
}

/// Detection outcome plus the fused raster that produced it.
#[derive(Debug, Clone)]
pub struct PestDetection {
    pub result: PestDetectionResult,
    /// The fused edge+Laplacian map, for persistence and inspection.
    pub fused: Raster<u8>,
}

/// Run the fusion detector over a scaled index raster.
///
/// Deterministic for a fixed raster and parameter set. Cannot fail on a
/// non-empty raster; an empty raster propagates as a typed core error.
pub fn detect(
    raster: &Raster<u8>,
    latitude: f64,
    longitude: f64,
    params: &DetectorParams,
) -> Result<PestDetection> {
    let edges = edge_map(raster, params.edge)?;
    let laplacian = laplacian_abs(raster)?;
    let fused = fuse_weighted(&edges, &laplacian, params.edge_weight, params.laplacian_weight)?;

    let total = fused.len();
    let affected = fused
        .data()
        .iter()
        .filter(|&&v| v > params.affected_cutoff)
        .count();

    let density = affected as f64 / total as f64 * 100.0;
    let status = HealthStatus::classify(density, params);

    Ok(PestDetection {
        result: PestDetectionResult {
            latitude,
            longitude,
            diseased_area_pct: density,
            healthy_area_pct: 100.0 - density,
            status,
            status_color: status.color(),
        },
        fused,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DetectorParams {
        DetectorParams::default()
    }

    #[test]
    fn uniform_raster_is_healthy() {
        let r = Raster::filled(20, 20, 140u8);
        let detection = detect(&r, 4.5, -74.0, &params()).unwrap();
        assert_eq!(detection.result.diseased_area_pct, 0.0);
        assert_eq!(detection.result.healthy_area_pct, 100.0);
        assert_eq!(detection.result.status, HealthStatus::Healthy);
        assert!(detection.fused.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn density_complement_is_exact() {
        // Two-pixel vertical stripes: every stripe boundary is a genuine
        // gradient edge, so the fused map has plenty of affected pixels.
        // (A 1-pixel checkerboard would not do: the Sobel neighborhoods
        // cancel exactly there.)
        let mut r = Raster::new(16, 16);
        for row in 0..16 {
            for col in 0..16 {
                r.set(row, col, if (col / 2) % 2 == 0 { 0 } else { 255 })
                    .unwrap();
            }
        }
        let detection = detect(&r, 0.0, 0.0, &params()).unwrap();
        let d = detection.result.diseased_area_pct;
        assert!((0.0..=100.0).contains(&d));
        assert_eq!(detection.result.healthy_area_pct, 100.0 - d);
        assert!(d > 0.0, "stripe boundaries must register affected pixels");
    }

    #[test]
    fn classification_ladder_boundaries() {
        let p = params();
        assert_eq!(HealthStatus::classify(9.999, &p), HealthStatus::Healthy);
        assert_eq!(HealthStatus::classify(10.0, &p), HealthStatus::Moderate);
        assert_eq!(HealthStatus::classify(29.999, &p), HealthStatus::Moderate);
        assert_eq!(HealthStatus::classify(30.0, &p), HealthStatus::Diseased);
        assert_eq!(HealthStatus::classify(0.0, &p), HealthStatus::Healthy);
        assert_eq!(HealthStatus::classify(100.0, &p), HealthStatus::Diseased);
    }

    #[test]
    fn status_colors() {
        assert_eq!(HealthStatus::Healthy.color(), "green");
        assert_eq!(HealthStatus::Moderate.color(), "yellow");
        assert_eq!(HealthStatus::Diseased.color(), "red");
    }

    #[test]
    fn detection_is_deterministic() {
        let mut r = Raster::new(24, 24);
        for row in 0..24 {
            for col in 0..24 {
                r.set(row, col, ((row * 11 + col * 7) % 256) as u8).unwrap();
            }
        }
        let first = detect(&r, 1.0, 2.0, &params()).unwrap();
        let second = detect(&r, 1.0, 2.0, &params()).unwrap();
        assert_eq!(first.fused.data(), second.fused.data());
        assert_eq!(
            first.result.diseased_area_pct,
            second.result.diseased_area_pct
        );
        assert_eq!(first.result.status, second.result.status);
    }

    #[test]
    fn rounded_keeps_complement() {
        let result = PestDetectionResult {
            latitude: 4.5,
            longitude: -74.0,
            diseased_area_pct: 12.3456,
            healthy_area_pct: 100.0 - 12.3456,
            status: HealthStatus::Moderate,
            status_color: "yellow",
        };
        let rounded = result.rounded();
        assert_eq!(rounded.diseased_area_pct, 12.35);
        assert_eq!(
            rounded.diseased_area_pct + rounded.healthy_area_pct,
            100.0
        );
    }

    #[test]
    fn serializes_status_fields() {
        let r = Raster::filled(8, 8, 10u8);
        let detection = detect(&r, 4.5, -74.0, &params()).unwrap();
        let json = serde_json::to_value(detection.result.rounded()).unwrap();
        assert_eq!(json["status"], "Healthy");
        assert_eq!(json["status_color"], "green");
    }
}

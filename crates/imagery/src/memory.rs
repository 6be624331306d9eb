//! In-memory imagery provider
//!
//! Serves pre-built scenes from memory. Used by the pipeline integration
//! tests and handy for offline experiments; follows the same contract as
//! the network provider, including typed no-imagery failures.

use std::collections::HashMap;

use chrono::NaiveDate;

use cropsense_core::Raster;

use crate::error::{ImageryError, Result};
use crate::provider::{BBox, DateRange, GeoPoint, ImageryProvider, SceneBands, SceneRef};
use crate::resample::clip_resample;

/// A fully materialized scene held in memory.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    pub id: String,
    pub datetime: NaiveDate,
    pub cloud_cover: f64,
    pub nir: Raster<f64>,
    pub red: Raster<f64>,
}

impl MemoryScene {
    fn footprint(&self) -> BBox {
        let (min_x, min_y, max_x, max_y) = self.nir.bounds();
        BBox {
            west: min_x,
            south: min_y,
            east: max_x,
            north: max_y,
        }
    }
}

/// Provider backed by a fixed set of scenes.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    scenes: Vec<MemoryScene>,
}

impl MemoryProvider {
    pub fn new(scenes: Vec<MemoryScene>) -> Self {
        Self { scenes }
    }

    pub fn empty() -> Self {
        Self { scenes: Vec::new() }
    }

    pub fn push(&mut self, scene: MemoryScene) {
        self.scenes.push(scene);
    }
}

impl ImageryProvider for MemoryProvider {
    async fn acquire(&self, point: GeoPoint, range: DateRange) -> Result<SceneRef> {
        let region = point.buffer_bbox(crate::provider::BUFFER_RADIUS_M);

        let best = self
            .scenes
            .iter()
            .filter(|s| range.contains(s.datetime) && s.footprint().intersects(&region))
            .min_by(|a, b| a.cloud_cover.total_cmp(&b.cloud_cover))
            .ok_or_else(|| ImageryError::NoImagery {
                datetime: range.as_interval(),
            })?;

        Ok(SceneRef {
            id: best.id.clone(),
            datetime: Some(best.datetime.to_string()),
            cloud_cover: Some(best.cloud_cover),
            assets: HashMap::new(),
        })
    }

    async fn export(
        &self,
        scene: &SceneRef,
        point: GeoPoint,
        region: BBox,
        gsd_m: f64,
    ) -> Result<SceneBands> {
        let found = self
            .scenes
            .iter()
            .find(|s| s.id == scene.id)
            .ok_or_else(|| ImageryError::UnknownScene(scene.id.clone()))?;

        let nir = clip_resample(&found.nir, point, region, gsd_m)?;
        let red = clip_resample(&found.red, point, region, gsd_m)?;
        Ok(SceneBands { nir, red })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropsense_core::GeoTransform;

    fn scene(id: &str, date: (i32, u32, u32), cloud: f64) -> MemoryScene {
        let mut band: Raster<f64> = Raster::filled(100, 100, 1000.0);
        band.set_transform(GeoTransform::new(-0.02, 0.02, 0.0004, -0.0004));
        MemoryScene {
            id: id.to_string(),
            datetime: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            cloud_cover: cloud,
            nir: band.clone(),
            red: band,
        }
    }

    fn july_2021() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2021, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 7, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn picks_least_cloudy_scene_in_range() {
        let provider = MemoryProvider::new(vec![
            scene("cloudy", (2021, 7, 5), 80.0),
            scene("clear", (2021, 7, 10), 2.5),
            scene("out-of-range", (2021, 9, 1), 0.0),
        ]);

        let selected = provider
            .acquire(GeoPoint::new(0.0, 0.0), july_2021())
            .await
            .unwrap();
        assert_eq!(selected.id, "clear");
        assert_eq!(selected.cloud_cover, Some(2.5));
    }

    #[tokio::test]
    async fn empty_range_is_no_imagery() {
        let provider = MemoryProvider::new(vec![scene("only", (2021, 7, 5), 1.0)]);
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(),
        );

        let err = provider
            .acquire(GeoPoint::new(0.0, 0.0), range)
            .await
            .unwrap_err();
        assert!(matches!(err, ImageryError::NoImagery { .. }));
    }

    #[tokio::test]
    async fn scene_outside_point_is_skipped() {
        let provider = MemoryProvider::new(vec![scene("far", (2021, 7, 5), 1.0)]);
        let err = provider
            .acquire(GeoPoint::new(45.0, 45.0), july_2021())
            .await
            .unwrap_err();
        assert!(matches!(err, ImageryError::NoImagery { .. }));
    }

    #[tokio::test]
    async fn export_clips_to_analysis_grid() {
        let provider = MemoryProvider::new(vec![scene("s", (2021, 7, 5), 1.0)]);
        let point = GeoPoint::new(0.0, 0.0);
        let selected = provider.acquire(point, july_2021()).await.unwrap();

        let region = point.buffer_bbox(1000.0);
        let bands = provider.export(&selected, point, region, 10.0).await.unwrap();
        assert_eq!(bands.nir.shape(), (200, 200));
        assert_eq!(bands.red.shape(), (200, 200));
        assert_eq!(bands.nir.get(100, 100).unwrap(), 1000.0);
    }

    #[tokio::test]
    async fn unknown_scene_handle_is_rejected() {
        let provider = MemoryProvider::empty();
        let fake = SceneRef {
            id: "missing".into(),
            datetime: None,
            cloud_cover: None,
            assets: HashMap::new(),
        };
        let point = GeoPoint::new(0.0, 0.0);
        let err = provider
            .export(&fake, point, point.buffer_bbox(1000.0), 10.0)
            .await
            .unwrap_err();
        assert!(matches!(err, ImageryError::UnknownScene(_)));
    }
}

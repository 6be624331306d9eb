//! The imagery provider abstraction

use std::collections::HashMap;

use chrono::NaiveDate;

use cropsense_core::Raster;

use crate::error::Result;

/// Radius of the square export buffer around the analyzed point, in meters.
pub const BUFFER_RADIUS_M: f64 = 1000.0;

/// Ground sampling distance of the exported grid, in meters per pixel.
pub const GROUND_SAMPLING_M: f64 = 10.0;

/// Meters per degree of latitude (spherical approximation).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// A geographic point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Square bounding box of `radius_m` meters around the point.
    ///
    /// Longitude extent is widened by the latitude cosine so the box stays
    /// square on the ground. Near the poles the cosine is clamped to keep
    /// the box finite.
    pub fn buffer_bbox(&self, radius_m: f64) -> BBox {
        let dlat = radius_m / METERS_PER_DEGREE;
        let cos_lat = self.latitude.to_radians().cos().abs().max(1e-6);
        let dlon = radius_m / (METERS_PER_DEGREE * cos_lat);
        BBox {
            west: self.longitude - dlon,
            south: self.latitude - dlat,
            east: self.longitude + dlon,
            north: self.latitude + dlat,
        }
    }

    /// Degree sizes of one output pixel at this latitude for a metric GSD.
    pub fn pixel_degrees(&self, gsd_m: f64) -> (f64, f64) {
        let dlat = gsd_m / METERS_PER_DEGREE;
        let cos_lat = self.latitude.to_radians().cos().abs().max(1e-6);
        let dlon = gsd_m / (METERS_PER_DEGREE * cos_lat);
        (dlon, dlat)
    }
}

/// Inclusive date range for catalog filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// STAC datetime interval string, e.g. `"2021-01-01/2021-12-31"`.
    pub fn as_interval(&self) -> String {
        format!("{}/{}", self.start, self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Geographic bounding box `[west, south, east, north]` in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BBox {
    pub fn as_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    pub fn intersects(&self, other: &BBox) -> bool {
        self.west <= other.east
            && other.west <= self.east
            && self.south <= other.north
            && other.south <= self.north
    }
}

/// Opaque handle to a selected satellite scene.
///
/// Carries the identifiers and acquisition metadata the pipeline needs to
/// request band exports and to log what it picked; never persisted.
#[derive(Debug, Clone)]
pub struct SceneRef {
    /// Catalog item id.
    pub id: String,
    /// ISO 8601 acquisition datetime, when the catalog supplies one.
    pub datetime: Option<String>,
    /// Cloud-cover quality score in percent; lower is better.
    pub cloud_cover: Option<f64>,
    /// Band asset key -> href.
    pub assets: HashMap<String, String>,
}

/// NIR and RED band rasters exported over the analysis region.
#[derive(Debug, Clone)]
pub struct SceneBands {
    pub nir: Raster<f64>,
    pub red: Raster<f64>,
}

/// Source of multispectral imagery.
///
/// Implementations must return typed failures: an empty catalog result is
/// [`crate::ImageryError::NoImagery`], never a placeholder scene, and a
/// failed or empty export is a typed error, never a bare empty raster.
pub trait ImageryProvider: Send + Sync {
    /// Select the least-cloudy scene covering `point` within `range`.
    fn acquire(
        &self,
        point: GeoPoint,
        range: DateRange,
    ) -> impl std::future::Future<Output = Result<SceneRef>> + Send;

    /// Export the scene's NIR and RED bands clipped to `region` and
    /// resampled to `gsd_m` meters per pixel.
    fn export(
        &self,
        scene: &SceneRef,
        point: GeoPoint,
        region: BBox,
        gsd_m: f64,
    ) -> impl std::future::Future<Output = Result<SceneBands>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn buffer_bbox_is_square_on_the_ground() {
        let p = GeoPoint::new(0.0, 0.0);
        let bbox = p.buffer_bbox(1000.0);
        // At the equator both extents are ~0.009 degrees.
        assert_relative_eq!(bbox.north - bbox.south, 2000.0 / 111_320.0, epsilon = 1e-12);
        assert_relative_eq!(bbox.east - bbox.west, 2000.0 / 111_320.0, epsilon = 1e-12);

        let p = GeoPoint::new(60.0, 10.0);
        let bbox = p.buffer_bbox(1000.0);
        // At 60N the longitude extent doubles.
        let lat_extent = bbox.north - bbox.south;
        let lon_extent = bbox.east - bbox.west;
        assert_relative_eq!(lon_extent / lat_extent, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn interval_formatting() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
        );
        assert_eq!(range.as_interval(), "2021-01-01/2021-12-31");
        assert!(range.contains(NaiveDate::from_ymd_opt(2021, 6, 15).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()));
    }

    #[test]
    fn bbox_intersection() {
        let a = BBox { west: 0.0, south: 0.0, east: 2.0, north: 2.0 };
        let b = BBox { west: 1.0, south: 1.0, east: 3.0, north: 3.0 };
        let c = BBox { west: 5.0, south: 5.0, east: 6.0, north: 6.0 };
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}

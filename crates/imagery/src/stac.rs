//! STAC Item Search wire models
//!
//! Minimal serde types for `POST /search` requests and responses: bbox and
//! datetime filtering, `eo:cloud_cover` ranking and asset hrefs. Pagination
//! is not modeled; the pipeline only ever needs the best scene from the
//! first page.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Body for `POST /search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// A STAC ItemCollection (GeoJSON FeatureCollection).
#[derive(Debug, Clone, Deserialize)]
pub struct ItemCollection {
    pub features: Vec<Item>,
}

/// A single STAC Item.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub id: String,
    pub properties: ItemProperties,
    pub assets: HashMap<String, Asset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemProperties {
    pub datetime: Option<String>,

    #[serde(rename = "eo:cloud_cover")]
    pub eo_cloud_cover: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub href: String,
}

impl Item {
    /// Cloud cover used for ranking; items without the property sort last.
    pub fn cloud_score(&self) -> f64 {
        self.properties.eo_cloud_cover.unwrap_or(f64::INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "id": "S2B_18NWM_20210705_0_L2A",
          "properties": {
            "datetime": "2021-07-05T15:28:41Z",
            "eo:cloud_cover": 12.4
          },
          "assets": {
            "red": { "href": "https://example.com/B04.tif" },
            "nir": { "href": "https://example.com/B08.tif" }
          }
        },
        {
          "type": "Feature",
          "id": "S2A_18NWM_20210710_0_L2A",
          "properties": {
            "datetime": "2021-07-10T15:28:44Z",
            "eo:cloud_cover": 3.1
          },
          "assets": {
            "red": { "href": "https://example.com/B04b.tif" },
            "nir": { "href": "https://example.com/B08b.tif" }
          }
        },
        {
          "type": "Feature",
          "id": "S2A_18NWM_20210715_0_L2A",
          "properties": { "datetime": "2021-07-15T15:28:44Z" },
          "assets": {}
        }
      ]
    }"#;

    #[test]
    fn parses_items_and_cloud_scores() {
        let col: ItemCollection = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(col.features.len(), 3);
        assert!((col.features[0].cloud_score() - 12.4).abs() < 1e-9);
        assert!((col.features[1].cloud_score() - 3.1).abs() < 1e-9);
        // Missing cloud cover ranks last.
        assert!(col.features[2].cloud_score().is_infinite());
    }

    #[test]
    fn least_cloudy_sorts_first() {
        let mut col: ItemCollection = serde_json::from_str(FIXTURE).unwrap();
        col.features
            .sort_by(|a, b| a.cloud_score().total_cmp(&b.cloud_score()));
        assert_eq!(col.features[0].id, "S2A_18NWM_20210710_0_L2A");
    }

    #[test]
    fn search_params_skip_empty_fields() {
        let params = SearchParams {
            bbox: Some([-74.1, 4.4, -73.9, 4.6]),
            datetime: Some("2021-01-01/2021-12-31".into()),
            collections: Some(vec!["sentinel-2-l2a".into()]),
            limit: Some(50),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["datetime"], "2021-01-01/2021-12-31");
        assert_eq!(json["limit"], 50);

        let empty = SearchParams {
            bbox: None,
            datetime: None,
            collections: None,
            limit: None,
        };
        let json = serde_json::to_value(&empty).unwrap();
        assert!(json.as_object().unwrap().is_empty());
    }
}

//! STAC-backed imagery provider
//!
//! Searches a STAC Item Search endpoint for scenes over the analysis point
//! and date range, ranks them by `eo:cloud_cover`, and downloads band asset
//! GeoTIFFs for export. Every HTTP call is bounded by a client timeout;
//! transient failures are retried with exponential backoff, client errors
//! (4xx) and empty result sets are not.

use std::time::Duration;

use tracing::{debug, info};

use cropsense_core::io::decode_geotiff;
use cropsense_core::Raster;

use crate::error::{ImageryError, Result};
use crate::provider::{BBox, DateRange, GeoPoint, ImageryProvider, SceneBands, SceneRef};
use crate::resample::clip_resample;
use crate::stac::{ItemCollection, SearchParams};

/// Well-known STAC catalogs plus custom endpoints.
#[derive(Debug, Clone)]
pub enum StacCatalog {
    /// AWS Earth Search (Element 84).
    EarthSearch,
    /// Any STAC API root URL.
    Custom(String),
}

impl StacCatalog {
    /// Full POST `/search` URL for this catalog.
    pub fn search_url(&self) -> String {
        match self {
            Self::EarthSearch => "https://earth-search.aws.element84.com/v1/search".to_string(),
            Self::Custom(base) => {
                let base = base.trim_end_matches('/');
                if base.ends_with("/search") {
                    base.to_string()
                } else {
                    format!("{base}/search")
                }
            }
        }
    }

    /// Parse a shorthand (`"es"`, `"earth-search"`) or treat the string as
    /// a custom URL.
    pub fn from_str_or_url(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "es" | "earth-search" | "earthsearch" => Self::EarthSearch,
            url => Self::Custom(url.to_string()),
        }
    }
}

/// Configuration for [`StacProvider`].
#[derive(Debug, Clone)]
pub struct StacProviderOptions {
    /// Collection to search (default Sentinel-2 L2A).
    pub collection: String,
    /// Asset key of the near-infrared band.
    pub nir_asset: String,
    /// Asset key of the red band.
    pub red_asset: String,
    /// Per-request timeout (default 30 s).
    pub request_timeout: Duration,
    /// Maximum retries on transient failures (default 3).
    pub max_retries: u32,
    /// Maximum candidate scenes requested per search (default 50).
    pub search_limit: u32,
}

impl Default for StacProviderOptions {
    fn default() -> Self {
        Self {
            collection: "sentinel-2-l2a".to_string(),
            nir_asset: "nir".to_string(),
            red_asset: "red".to_string(),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            search_limit: 50,
        }
    }
}

/// Imagery provider backed by a STAC catalog.
pub struct StacProvider {
    catalog: StacCatalog,
    client: reqwest::Client,
    options: StacProviderOptions,
}

impl StacProvider {
    pub fn new(catalog: StacCatalog, options: StacProviderOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| ImageryError::Download(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            catalog,
            client,
            options,
        })
    }

    pub fn catalog(&self) -> &StacCatalog {
        &self.catalog
    }

    async fn search(&self, params: &SearchParams) -> Result<ItemCollection> {
        let url = self.catalog.search_url();
        let mut last_err = None;

        for attempt in 0..=self.options.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                tokio::time::sleep(delay).await;
            }

            let resp = self.client.post(&url).json(params).send().await;
            match resp {
                Ok(r) if r.status().is_success() => {
                    let body = r.text().await.map_err(|e| {
                        ImageryError::Download(format!("reading search response: {e}"))
                    })?;
                    return serde_json::from_str(&body).map_err(|e| {
                        ImageryError::Download(format!("parsing search response: {e}"))
                    });
                }
                Ok(r) => {
                    let status = r.status();
                    let body = r.text().await.unwrap_or_default();
                    last_err = Some(ImageryError::Download(format!(
                        "search returned HTTP {}: {}",
                        status,
                        body.chars().take(300).collect::<String>()
                    )));
                    if status.is_client_error() {
                        break;
                    }
                }
                Err(e) => {
                    last_err = Some(ImageryError::Download(format!("search request: {e}")));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ImageryError::Download("search failed".into())))
    }

    async fn download_band(&self, scene: &SceneRef, asset_key: &str) -> Result<Raster<f64>> {
        let href = scene
            .assets
            .get(asset_key)
            .ok_or_else(|| ImageryError::MissingBand {
                scene: scene.id.clone(),
                band: asset_key.to_string(),
            })?;

        let mut last_err = None;
        for attempt in 0..=self.options.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                tokio::time::sleep(delay).await;
            }

            let resp = self.client.get(href).send().await;
            match resp {
                Ok(r) if r.status().is_success() => {
                    let bytes = r.bytes().await.map_err(|e| {
                        ImageryError::Download(format!("reading band bytes: {e}"))
                    })?;
                    debug!(scene = %scene.id, band = asset_key, len = bytes.len(), "band downloaded");
                    return Ok(decode_geotiff(&bytes)?);
                }
                Ok(r) => {
                    let status = r.status();
                    last_err = Some(ImageryError::Download(format!(
                        "band download returned HTTP {status} for {href}"
                    )));
                    if status.is_client_error() {
                        break;
                    }
                }
                Err(e) => {
                    last_err = Some(ImageryError::Download(format!("band download: {e}")));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ImageryError::Download("band download failed".into())))
    }
}

impl ImageryProvider for StacProvider {
    async fn acquire(&self, point: GeoPoint, range: DateRange) -> Result<SceneRef> {
        let bbox = point.buffer_bbox(crate::provider::BUFFER_RADIUS_M);
        let params = SearchParams {
            bbox: Some(bbox.as_array()),
            datetime: Some(range.as_interval()),
            collections: Some(vec![self.options.collection.clone()]),
            limit: Some(self.options.search_limit),
        };

        let mut collection = self.search(&params).await?;
        if collection.features.is_empty() {
            return Err(ImageryError::NoImagery {
                datetime: range.as_interval(),
            });
        }

        collection
            .features
            .sort_by(|a, b| a.cloud_score().total_cmp(&b.cloud_score()));
        let best = collection.features.swap_remove(0);

        info!(
            scene = %best.id,
            cloud_cover = ?best.properties.eo_cloud_cover,
            "selected least-cloudy scene"
        );

        Ok(SceneRef {
            id: best.id,
            datetime: best.properties.datetime,
            cloud_cover: best.properties.eo_cloud_cover,
            assets: best
                .assets
                .into_iter()
                .map(|(k, a)| (k, a.href))
                .collect(),
        })
    }

    async fn export(
        &self,
        scene: &SceneRef,
        point: GeoPoint,
        region: BBox,
        gsd_m: f64,
    ) -> Result<SceneBands> {
        let nir_full = self.download_band(scene, &self.options.nir_asset).await?;
        let red_full = self.download_band(scene, &self.options.red_asset).await?;

        let nir = clip_resample(&nir_full, point, region, gsd_m)?;
        let red = clip_resample(&red_full, point, region, gsd_m)?;
        Ok(SceneBands { nir, red })
    }
}

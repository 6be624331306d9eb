//! Process-lifetime result store

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;

use cropsense_analysis::PestDetectionResult;

use crate::request::RequestKey;

/// A stored detection outcome plus the path of its fused-map artifact.
#[derive(Debug, Clone)]
pub struct StoredResult {
    pub result: PestDetectionResult,
    pub artifact_path: PathBuf,
}

/// Shared map of completed analyses keyed by the full request.
///
/// Last write wins on a repeated key. Entries live for the lifetime of the
/// process; there is no eviction.
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: RwLock<HashMap<RequestKey, StoredResult>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: RequestKey, result: PestDetectionResult, artifact_path: PathBuf) {
        self.inner.write().insert(
            key,
            StoredResult {
                result,
                artifact_path,
            },
        );
    }

    pub fn get(&self, key: &RequestKey) -> Option<StoredResult> {
        self.inner.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::AnalysisRequest;
    use chrono::NaiveDate;
    use cropsense_analysis::HealthStatus;

    fn result(diseased: f64, status: HealthStatus) -> PestDetectionResult {
        PestDetectionResult {
            latitude: 4.5,
            longitude: -74.1,
            diseased_area_pct: diseased,
            healthy_area_pct: 100.0 - diseased,
            status,
            status_color: status.color(),
        }
    }

    fn request(start_month: u32) -> AnalysisRequest {
        AnalysisRequest::new(
            4.5,
            -74.1,
            NaiveDate::from_ymd_opt(2021, start_month, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn put_get_roundtrip() {
        let store = ResultStore::new();
        let key = request(1).key();
        store.put(key, result(5.0, HealthStatus::Healthy), "a.png".into());

        let stored = store.get(&key).unwrap();
        assert_eq!(stored.result.diseased_area_pct, 5.0);
        assert_eq!(stored.artifact_path, PathBuf::from("a.png"));
        assert!(store.get(&request(2).key()).is_none());
    }

    #[test]
    fn repeated_key_last_write_wins() {
        let store = ResultStore::new();
        let key = request(1).key();
        store.put(key, result(5.0, HealthStatus::Healthy), "a.png".into());
        store.put(key, result(42.0, HealthStatus::Diseased), "b.png".into());

        assert_eq!(store.len(), 1);
        let stored = store.get(&key).unwrap();
        assert_eq!(stored.result.status, HealthStatus::Diseased);
        assert_eq!(stored.artifact_path, PathBuf::from("b.png"));
    }

    #[test]
    fn same_point_different_ranges_coexist() {
        let store = ResultStore::new();
        store.put(
            request(1).key(),
            result(5.0, HealthStatus::Healthy),
            "jan.png".into(),
        );
        store.put(
            request(7).key(),
            result(35.0, HealthStatus::Diseased),
            "jul.png".into(),
        );

        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(&request(1).key()).unwrap().result.status,
            HealthStatus::Healthy
        );
        assert_eq!(
            store.get(&request(7).key()).unwrap().result.status,
            HealthStatus::Diseased
        );
    }
}

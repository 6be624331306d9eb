//! Analysis requests and their store identity

use chrono::NaiveDate;

use cropsense_imagery::{DateRange, GeoPoint};

use crate::error::{PipelineError, Result};

/// One analysis request: a point on the ground and a date window to search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl AnalysisRequest {
    /// Build a validated request.
    pub fn new(
        latitude: f64,
        longitude: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self> {
        let request = Self {
            latitude,
            longitude,
            start_date,
            end_date,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check coordinate ranges and date ordering.
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(PipelineError::InvalidRequest(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(PipelineError::InvalidRequest(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }
        if self.start_date > self.end_date {
            return Err(PipelineError::InvalidRequest(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Store identity of this request.
    pub fn key(&self) -> RequestKey {
        RequestKey {
            lat_bits: self.latitude.to_bits(),
            lon_bits: self.longitude.to_bits(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Artifact filename, a pure function of the full request.
    pub fn artifact_file_name(&self) -> String {
        format!(
            "pest_{}_{}_{}_{}.png",
            self.latitude, self.longitude, self.start_date, self.end_date
        )
    }
}

/// Date window assumed when a request omits one.
pub fn default_date_range() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
    )
}

/// Hashable identity of a request: coordinate bit patterns plus both dates.
///
/// Including the date range keeps two analyses of the same point over
/// different windows from colliding in the result store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestKey {
    lat_bits: u64,
    lon_bits: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn valid_request_passes() {
        let r = AnalysisRequest::new(4.5, -74.1, date(2021, 1, 1), date(2021, 12, 31));
        assert!(r.is_ok());
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        assert!(matches!(
            AnalysisRequest::new(95.0, 0.0, date(2021, 1, 1), date(2021, 12, 31)),
            Err(PipelineError::InvalidRequest(_))
        ));
        assert!(matches!(
            AnalysisRequest::new(0.0, -200.0, date(2021, 1, 1), date(2021, 12, 31)),
            Err(PipelineError::InvalidRequest(_))
        ));
        assert!(matches!(
            AnalysisRequest::new(f64::NAN, 0.0, date(2021, 1, 1), date(2021, 12, 31)),
            Err(PipelineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn reversed_dates_rejected() {
        assert!(matches!(
            AnalysisRequest::new(0.0, 0.0, date(2021, 12, 31), date(2021, 1, 1)),
            Err(PipelineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn key_distinguishes_date_ranges() {
        let a = AnalysisRequest::new(4.5, -74.1, date(2021, 1, 1), date(2021, 6, 30)).unwrap();
        let b = AnalysisRequest::new(4.5, -74.1, date(2021, 7, 1), date(2021, 12, 31)).unwrap();
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), a.key());
    }

    #[test]
    fn artifact_name_carries_full_request() {
        let r = AnalysisRequest::new(4.5, -74.1, date(2021, 1, 1), date(2021, 12, 31)).unwrap();
        assert_eq!(
            r.artifact_file_name(),
            "pest_4.5_-74.1_2021-01-01_2021-12-31.png"
        );
    }

    #[test]
    fn default_range_is_2021() {
        let (start, end) = default_date_range();
        assert_eq!(start, date(2021, 1, 1));
        assert_eq!(end, date(2021, 12, 31));
    }
}

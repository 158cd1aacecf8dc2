// src/request.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::raster::MapPoint;

/// Immutable parameters for one chart computation. Produced by the caller
/// per request; the pipeline reads no ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub dataset: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub point: MapPoint,
}

impl ChartRequest {
    pub fn new(dataset: impl Into<String>, start: NaiveDate, end: NaiveDate, point: MapPoint) -> Self {
        Self {
            dataset: dataset.into(),
            start,
            end,
            point,
        }
    }

    /// Date-range filter: start inclusive, end exclusive.
    pub fn covers(&self, timestamp: DateTime<Utc>) -> bool {
        let day = timestamp.date_naive();
        day >= self.start && day < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_range_is_end_exclusive() {
        let req = ChartRequest::new(
            "Sentinel-2",
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
            MapPoint::new(0.0, 0.0),
        );
        let inside = Utc.with_ymd_and_hms(2023, 1, 31, 23, 59, 0).unwrap();
        let boundary = Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2022, 12, 31, 12, 0, 0).unwrap();
        assert!(req.covers(inside));
        assert!(!req.covers(boundary));
        assert!(!req.covers(before));
    }
}

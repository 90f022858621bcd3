use chrono::{DateTime, TimeZone as _, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{
    geo_point::GeoPoint,
    station::{station_id_schema, Station},
    ExampleData,
};

/// An accepted capture. Created once after a positive proximity decision and
/// never changed afterwards.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRecord {
    #[schemars(schema_with = "station_id_schema")]
    pub station_id: Id<Station>,
    #[serde(flatten)]
    pub point: GeoPoint,
    pub accuracy_meters: Option<f64>,
    pub captured_at: DateTime<Utc>,
}

impl HasId for CaptureRecord {
    type IdType = i64;
}

impl ExampleData for CaptureRecord {
    fn example_data() -> Self {
        Self {
            station_id: Id::new("STN-3F9A21C0".to_owned()),
            point: GeoPoint::example_data(),
            accuracy_meters: Some(12.5),
            captured_at: Utc.with_ymd_and_hms(2024, 5, 2, 10, 4, 51).unwrap(),
        }
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationSummary {
    #[schemars(schema_with = "station_id_schema")]
    pub station_id: Id<Station>,
    pub name: String,
    pub capture_count: i64,
    pub last_captured_at: Option<DateTime<Utc>>,
}

/// Aggregated numbers for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSummary {
    pub total_stations: i64,
    pub total_captures: i64,
    pub since: DateTime<Utc>,
    pub captures_since: i64,
    pub stations: Vec<StationSummary>,
}

impl ExampleData for CaptureSummary {
    fn example_data() -> Self {
        let capture = CaptureRecord::example_data();
        Self {
            total_stations: 1,
            total_captures: 1,
            since: Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap(),
            captures_since: 1,
            stations: vec![StationSummary {
                station_id: capture.station_id,
                name: Station::example_data().name,
                capture_count: 1,
                last_captured_at: Some(capture.captured_at),
            }],
        }
    }
}

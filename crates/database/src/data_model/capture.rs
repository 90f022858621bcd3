use chrono::{DateTime, Utc};
use model::{capture::CaptureRecord, geo_point::GeoPoint, WithId};
use sqlx::prelude::FromRow;
use utility::id::Id;

/// Table: `captures`
#[derive(Debug, Clone, FromRow)]
pub struct CaptureRow {
    pub id: i64,
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
    pub captured_at: DateTime<Utc>,
}

impl CaptureRow {
    pub fn to_model(self) -> WithId<CaptureRecord> {
        WithId::new(
            Id::new(self.id),
            CaptureRecord {
                station_id: Id::new(self.station_id),
                point: GeoPoint {
                    latitude: self.latitude,
                    longitude: self.longitude,
                },
                accuracy_meters: self.accuracy_meters,
                captured_at: self.captured_at,
            },
        )
    }
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct PointRow {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<PointRow> for GeoPoint {
    fn from(row: PointRow) -> Self {
        GeoPoint {
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

use chrono::{DateTime, Utc};
use model::{station::Station, WithId};
use sqlx::prelude::FromRow;
use utility::id::Id;

/// Table: `stations`
#[derive(Debug, Clone, FromRow)]
pub struct StationRow {
    pub id: String,
    pub name: String,
    pub owner_name: Option<String>,
    pub phone: Option<String>,
    pub station_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StationRow {
    pub fn to_model(self) -> WithId<Station> {
        WithId::new(
            Id::new(self.id),
            Station {
                name: self.name,
                owner_name: self.owner_name,
                phone: self.phone,
                station_type: self.station_type,
                created_at: self.created_at,
            },
        )
    }
}

/// One line of the per station dashboard aggregate.
#[derive(Debug, Clone, FromRow)]
pub struct StationSummaryRow {
    pub id: String,
    pub name: String,
    pub capture_count: i64,
    pub last_captured_at: Option<DateTime<Utc>>,
}

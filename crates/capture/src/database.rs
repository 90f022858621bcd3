use std::{error, result};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{
    capture::{CaptureRecord, CaptureSummary},
    geo_point::GeoPoint,
    station::Station,
    WithId,
};
use utility::id::Id;

#[derive(Debug)]
pub enum DatabaseError {
    NotFound,
    Other(Box<dyn error::Error + Send + Sync>),
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseError::NotFound => write!(f, "row not found"),
            DatabaseError::Other(why) => write!(f, "{}", why),
        }
    }
}

impl error::Error for DatabaseError {}

pub type Result<T> = result::Result<T, DatabaseError>;

#[derive(Debug, Clone, Default)]
pub struct CaptureFilter {
    pub station: Option<Id<Station>>,
    pub since: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait StationRepo {
    async fn insert_station(
        &mut self,
        station: WithId<Station>,
    ) -> Result<WithId<Station>>;

    async fn get_station(&mut self, id: &Id<Station>) -> Result<WithId<Station>>;

    /// All stations, newest first.
    async fn get_stations(&mut self) -> Result<Vec<WithId<Station>>>;

    async fn station_exists(&mut self, id: &Id<Station>) -> Result<bool>;
}

#[async_trait]
pub trait CaptureRepo {
    /// The points of all captures accepted for a station so far.
    async fn points_for_station(&mut self, station: &Id<Station>) -> Result<Vec<GeoPoint>>;

    async fn insert_capture(
        &mut self,
        capture: CaptureRecord,
    ) -> Result<WithId<CaptureRecord>>;

    /// Captures matching the filter, newest first.
    async fn get_captures(
        &mut self,
        filter: &CaptureFilter,
    ) -> Result<Vec<WithId<CaptureRecord>>>;

    async fn capture_summary(&mut self, since: DateTime<Utc>) -> Result<CaptureSummary>;
}

pub trait DatabaseOperations: StationRepo + CaptureRepo {}

#[async_trait]
pub trait DatabaseTransaction: DatabaseOperations {
    async fn commit(self) -> Result<()>;
}

pub trait DatabaseAutocommit: DatabaseOperations {}

/// trait to implement a capture store.
/// multiple concurrent accesses should be possible by e.g. cloning the database object.
#[async_trait]
pub trait Database: Clone + Send + Sync + Sized {
    type Transaction: DatabaseTransaction + Send;
    type Autocommit: DatabaseAutocommit + Send;

    async fn transaction(&self) -> Result<Self::Transaction>;

    fn auto(&self) -> Self::Autocommit;
}

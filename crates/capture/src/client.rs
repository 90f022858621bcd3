use std::sync::Arc;

use chrono::{DateTime, Utc};
use model::{
    capture::{CaptureRecord, CaptureSummary},
    geo_point::GeoPoint,
    proximity::{evaluate_capture, validate_threshold, Decision},
    station::{NewStation, Station},
    WithId,
};
use tokio::sync::Mutex;
use utility::{id::Id, let_also::LetAlso};

use crate::{
    database::{
        CaptureFilter, CaptureRepo, Database, DatabaseTransaction, StationRepo,
    },
    RequestError, RequestResult,
};

#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    Accepted(WithId<CaptureRecord>),
    Rejected { distance_meters: f64 },
}

#[derive(Debug, Clone)]
pub struct Client<D>
where
    D: Database + Send + Sync + Sized + 'static,
{
    pub database: D,
    threshold_meters: f64,
    // one submission at a time, so the prior points read for a decision are
    // still complete when the accepted capture is written
    capture_lock: Arc<Mutex<()>>,
}

impl<D> Client<D>
where
    D: Database,
{
    pub fn new(database: D, threshold_meters: f64) -> Self {
        Self {
            database,
            threshold_meters,
            capture_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn threshold_meters(&self) -> f64 {
        self.threshold_meters
    }

    /// Fails with `InvalidThreshold` if the configured threshold is unusable.
    pub fn check_configuration(&self) -> RequestResult<()> {
        validate_threshold(self.threshold_meters).map_err(RequestError::from)
    }
}

impl<D> Client<D>
where
    D: Database,
{
    pub async fn create_station(
        &self,
        station: NewStation,
    ) -> RequestResult<WithId<Station>> {
        let station = station.normalized().ok_or_else(|| {
            RequestError::InvalidInput("A station needs a non-empty name.".to_owned())
        })?;
        let result = self
            .database
            .auto()
            .insert_station(WithId::new(
                Station::generate_id(),
                station.into_station(Utc::now()),
            ))
            .await?;
        log::info!("registered station {} ({})", result.id, result.content.name);
        Ok(result)
    }

    pub async fn get_station(&self, id: &Id<Station>) -> RequestResult<WithId<Station>> {
        Ok(self.database.auto().get_station(id).await?)
    }

    pub async fn get_stations(&self) -> RequestResult<Vec<WithId<Station>>> {
        Ok(self.database.auto().get_stations().await?)
    }
}

impl<D> Client<D>
where
    D: Database,
{
    pub async fn get_captures(
        &self,
        filter: CaptureFilter,
    ) -> RequestResult<Vec<WithId<CaptureRecord>>> {
        let mut auto = self.database.auto();
        if let Some(station) = &filter.station {
            if !auto.station_exists(station).await? {
                return Err(RequestError::NotFound);
            }
        }
        Ok(auto.get_captures(&filter).await?)
    }

    pub async fn summary(&self, since: DateTime<Utc>) -> RequestResult<CaptureSummary> {
        Ok(self.database.auto().capture_summary(since).await?)
    }

    /// Decides about a capture without storing anything.
    pub async fn evaluate(
        &self,
        station: &Id<Station>,
        point: &GeoPoint,
    ) -> RequestResult<Decision> {
        let mut auto = self.database.auto();
        if !auto.station_exists(station).await? {
            return Err(RequestError::NotFound);
        }
        let existing = auto.points_for_station(station).await?;
        evaluate_capture(station, point, &existing, self.threshold_meters)
            .map_err(RequestError::from)
    }

    /// Evaluates a capture against everything stored for the station and
    /// stores it if it is no duplicate.
    pub async fn submit_capture(
        &self,
        station: &Id<Station>,
        point: GeoPoint,
        accuracy_meters: Option<f64>,
    ) -> RequestResult<CaptureOutcome> {
        let _guard = self.capture_lock.lock().await;
        let mut tx = self.database.transaction().await?;

        if !tx.station_exists(station).await? {
            return Err(RequestError::NotFound);
        }
        let existing = tx.points_for_station(station).await?;

        let decision =
            evaluate_capture(station, &point, &existing, self.threshold_meters)?;
        let outcome = match decision {
            Decision::Reject { distance_meters } => {
                log::info!(
                    "rejected capture for station {}: {:.1} m from a prior capture",
                    station,
                    distance_meters
                );
                return Ok(CaptureOutcome::Rejected { distance_meters });
            }
            Decision::Accept => tx
                .insert_capture(CaptureRecord {
                    station_id: station.clone(),
                    point,
                    accuracy_meters,
                    captured_at: Utc::now(),
                })
                .await?
                .let_owned(CaptureOutcome::Accepted),
        };

        tx.commit().await?;
        if let CaptureOutcome::Accepted(capture) = &outcome {
            log::info!(
                "stored capture {} for station {} at ({})",
                capture.id,
                station,
                capture.content.point
            );
        }
        Ok(outcome)
    }
}

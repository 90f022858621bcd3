//! Duplicate detection for captures.
//!
//! A capture is a duplicate if it lies strictly closer than the threshold to
//! any capture already accepted for the same station. The decision is a pure
//! function of its inputs; reading prior points and persisting accepted ones
//! is up to the caller.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utility::id::Id;

use crate::{
    geo_point::{GeoPoint, InvalidPointError},
    station::Station,
};

pub const DEFAULT_THRESHOLD_METERS: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum Decision {
    Accept,
    #[serde(rename_all = "camelCase")]
    Reject {
        /// Distance to the nearest prior capture of the station.
        distance_meters: f64,
    },
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Decision::Accept)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProximityError {
    #[error(transparent)]
    InvalidPoint(#[from] InvalidPointError),

    #[error("proximity threshold must be a non-negative number of meters, got {0}")]
    InvalidThreshold(f64),
}

pub fn validate_threshold(threshold_meters: f64) -> Result<(), ProximityError> {
    // NaN fails the comparison as well
    if threshold_meters >= 0.0 {
        Ok(())
    } else {
        Err(ProximityError::InvalidThreshold(threshold_meters))
    }
}

/// Decides whether `candidate` may be stored for `station_id` given the
/// points already stored for it.
///
/// Every existing point is visited, the reported distance of a rejection is
/// always the minimum over all of them.
pub fn evaluate_capture(
    station_id: &Id<Station>,
    candidate: &GeoPoint,
    existing: &[GeoPoint],
    threshold_meters: f64,
) -> Result<Decision, ProximityError> {
    validate_threshold(threshold_meters)?;
    candidate.validate()?;
    for point in existing {
        point.validate()?;
    }

    let nearest = existing
        .iter()
        .map(|point| candidate.distance_to(point))
        .fold(None, |nearest: Option<f64>, distance| match nearest {
            Some(current) if current <= distance => Some(current),
            _ => Some(distance),
        });

    let decision = match nearest {
        Some(distance_meters) if distance_meters < threshold_meters => {
            Decision::Reject { distance_meters }
        }
        _ => Decision::Accept,
    };

    log::debug!(
        "capture ({}) for station {} against {} prior point(s): {:?}",
        candidate,
        station_id,
        existing.len(),
        decision
    );

    Ok(decision)
}

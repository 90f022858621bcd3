use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utility::geo::haversine_distance;

use crate::ExampleData;

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A coordinate in degrees as reported by a device.
///
/// The fields are public so that stored or transmitted points can be carried
/// around as they are; use [`GeoPoint::validate`] (or construct through
/// [`GeoPoint::new`]) before doing any math with them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinate {
    Latitude,
    Longitude,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Latitude => write!(f, "latitude"),
            Coordinate::Longitude => write!(f, "longitude"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid {coordinate} {value} in point ({latitude}, {longitude})")]
pub struct InvalidPointError {
    pub coordinate: Coordinate,
    pub value: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidPointError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate().map(|_| point)
    }

    pub fn validate(&self) -> Result<(), InvalidPointError> {
        let checks = [
            (Coordinate::Latitude, self.latitude, LATITUDE_RANGE),
            (Coordinate::Longitude, self.longitude, LONGITUDE_RANGE),
        ];
        for (coordinate, value, (min, max)) in checks {
            if !value.is_finite() || value < min || value > max {
                return Err(InvalidPointError {
                    coordinate,
                    value,
                    latitude: self.latitude,
                    longitude: self.longitude,
                });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Surface distance in meters. Both points are expected to be valid.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

impl ExampleData for GeoPoint {
    fn example_data() -> Self {
        Self {
            latitude: 6.524379,
            longitude: 3.379206,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_closed_range() {
        for (lat, lon) in [(90.0, 180.0), (-90.0, -180.0), (0.0, 0.0), (6.5244, 3.3792)] {
            assert!(GeoPoint::new(lat, lon).is_ok(), "({lat}, {lon})");
        }
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let err = GeoPoint::new(95.0, 3.0).unwrap_err();
        assert_eq!(err.coordinate, Coordinate::Latitude);
        assert_eq!(err.value, 95.0);
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        let err = GeoPoint::new(6.0, 200.0).unwrap_err();
        assert_eq!(err.coordinate, Coordinate::Longitude);
        assert_eq!(err.value, 200.0);
    }

    #[test]
    fn rejects_non_finite_values() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
        assert!(GeoPoint::new(f64::NEG_INFINITY, 0.0).is_err());
    }

    #[test]
    fn serializes_in_camel_case() {
        let json = serde_json::to_value(GeoPoint::example_data()).unwrap();
        assert_eq!(json["latitude"], 6.524379);
        assert_eq!(json["longitude"], 3.379206);
    }
}

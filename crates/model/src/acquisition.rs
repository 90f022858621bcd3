//! What a capture page reports back after asking the browser for its
//! position.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{geo_point::GeoPoint, ExampleData};

/// `GeolocationPositionError.code` values.
pub const PERMISSION_DENIED: u16 = 1;
pub const POSITION_UNAVAILABLE: u16 = 2;
pub const TIMEOUT: u16 = 3;

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum GeolocationReport {
    Position {
        latitude: f64,
        longitude: f64,
        /// Accuracy radius in meters, as reported by the device.
        accuracy: Option<f64>,
    },
    Error {
        code: u16,
        message: Option<String>,
    },
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    #[error("location permission was denied on the device")]
    PermissionDenied,

    #[error("the device could not determine its position")]
    Unavailable,

    #[error("the device took too long to determine its position")]
    Timeout,

    #[error("the browser does not support geolocation")]
    Unsupported,

    #[error("the browser reported an unknown geolocation error (code {0})")]
    UnknownCode(u16),
}

impl GeolocationReport {
    /// The reported point. Its range is not checked here.
    pub fn acquire(self) -> Result<GeoPoint, AcquisitionError> {
        match self {
            GeolocationReport::Position {
                latitude,
                longitude,
                ..
            } => Ok(GeoPoint {
                latitude,
                longitude,
            }),
            GeolocationReport::Error { code, .. } => Err(match code {
                PERMISSION_DENIED => AcquisitionError::PermissionDenied,
                POSITION_UNAVAILABLE => AcquisitionError::Unavailable,
                TIMEOUT => AcquisitionError::Timeout,
                other => AcquisitionError::UnknownCode(other),
            }),
            GeolocationReport::Unsupported => Err(AcquisitionError::Unsupported),
        }
    }

    /// Reported accuracy, if it is a usable number.
    pub fn accuracy(&self) -> Option<f64> {
        match self {
            GeolocationReport::Position {
                accuracy: Some(accuracy),
                ..
            } if accuracy.is_finite() && *accuracy >= 0.0 => Some(*accuracy),
            _ => None,
        }
    }
}

impl ExampleData for GeolocationReport {
    fn example_data() -> Self {
        let point = GeoPoint::example_data();
        GeolocationReport::Position {
            latitude: point.latitude,
            longitude: point.longitude,
            accuracy: Some(12.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn report(value: serde_json::Value) -> GeolocationReport {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn position_report_yields_the_point() {
        let report = report(json!({
            "status": "position",
            "latitude": 9.0765,
            "longitude": 7.3986,
            "accuracy": 18.0
        }));
        assert_eq!(report.accuracy(), Some(18.0));
        assert_eq!(
            report.acquire(),
            Ok(GeoPoint {
                latitude: 9.0765,
                longitude: 7.3986
            })
        );
    }

    #[test]
    fn accuracy_is_optional_and_sanitized() {
        let without = report(json!({ "status": "position", "latitude": 1.0, "longitude": 2.0 }));
        assert_eq!(without.accuracy(), None);

        let negative = report(json!({
            "status": "position", "latitude": 1.0, "longitude": 2.0, "accuracy": -4.0
        }));
        assert_eq!(negative.accuracy(), None);
    }

    #[test]
    fn browser_error_codes_are_mapped() {
        let cases = [
            (1, AcquisitionError::PermissionDenied),
            (2, AcquisitionError::Unavailable),
            (3, AcquisitionError::Timeout),
            (7, AcquisitionError::UnknownCode(7)),
        ];
        for (code, expected) in cases {
            let report = report(json!({ "status": "error", "code": code, "message": "nope" }));
            assert_eq!(report.acquire(), Err(expected));
        }
    }

    #[test]
    fn unsupported_browser() {
        let report = report(json!({ "status": "unsupported" }));
        assert_eq!(report.acquire(), Err(AcquisitionError::Unsupported));
    }

    #[test]
    fn out_of_range_points_pass_through_unchecked() {
        let report = report(json!({ "status": "position", "latitude": 95.0, "longitude": 2.0 }));
        let point = report.acquire().unwrap();
        assert!(!point.is_valid());
    }
}

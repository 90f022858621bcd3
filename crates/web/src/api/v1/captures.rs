use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::{header, Method},
    response::IntoResponse,
    routing::{get, on},
    Extension, Router,
};
use capture::{database::CaptureFilter, RequestError};
use chrono::{DateTime, Local, Utc};
use model::{capture::CaptureRecord, WithId};
use serde::{Deserialize, Serialize};
use utility::{id::Id, let_also::LetAlso, serde::date_time};

use crate::{
    common::{
        route_not_found, schema, HateoasResult, QueryParams, RouteErrorResponse,
        RouteResult, VecResponse, METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::BaseUrl,
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/captures{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/schema", get(schema::<CaptureRecord>))
        .route("/export", get(export_captures))
        .route("/", get(get_captures))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CapturesQuery {
    station: Option<String>,

    #[serde(deserialize_with = "date_time::deserialize_local_option", default)]
    since: Option<DateTime<Local>>,
}

impl CapturesQuery {
    /// An unparsable station id cannot match any station.
    fn into_filter(self) -> Result<CaptureFilter, RequestError> {
        let station = match self.station.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(Id::parse(raw).ok_or(RequestError::NotFound)?),
        };
        Ok(CaptureFilter {
            station,
            since: self.since.map(|since| since.with_timezone(&Utc)),
        })
    }
}

async fn get_captures(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { capture_client, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    QueryParams(params): QueryParams<CapturesQuery>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<CaptureRecord>>>> {
    let filter = params.into_filter().map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })?;
    capture_client
        .get_captures(filter)
        .await
        .map(|captures| {
            captures
                .into_iter()
                .map(|capture| capture_hateoas(capture, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::non_paginated(data).hateoas().json())
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

#[derive(Debug, Serialize)]
struct CaptureCsvRow<'a> {
    id: i64,
    station_id: &'a str,
    latitude: f64,
    longitude: f64,
    accuracy_meters: Option<f64>,
    captured_at: String,
}

async fn export_captures(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { capture_client, .. }): State<WebState>,
    QueryParams(params): QueryParams<CapturesQuery>,
) -> RouteResult<impl IntoResponse> {
    let with_context = |why: RequestError| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    };

    let filter = params.into_filter().map_err(with_context)?;
    let captures = capture_client.get_captures(filter).await.map_err(with_context)?;
    let csv = captures_to_csv(&captures).map_err(with_context)?;
    log::debug!("exported {} captures", captures.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"captures.csv\"",
            ),
        ],
        csv,
    ))
}

fn captures_to_csv(captures: &[WithId<CaptureRecord>]) -> Result<Vec<u8>, RequestError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    for capture in captures {
        let station_id = capture.content.station_id.raw();
        writer
            .serialize(CaptureCsvRow {
                id: capture.id.raw(),
                station_id: &station_id,
                latitude: capture.content.point.latitude,
                longitude: capture.content.point.longitude,
                accuracy_meters: capture.content.accuracy_meters,
                captured_at: capture.content.captured_at.to_rfc3339(),
            })
            .map_err(RequestError::other)?;
    }
    writer
        .into_inner()
        .map_err(|why| RequestError::other(why.into_error()))
}

pub(crate) fn capture_hateoas(
    capture: WithId<CaptureRecord>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<WithId<CaptureRecord>> {
    let point = capture.content.point;
    let station_id = capture.content.station_id.clone();
    hateoas::Response::builder(capture, base_url)
        .link(
            "station",
            super::stations::resource!("/{}", station_id),
        )
        .link_extern(
            "map",
            format!(
                "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=18/{lat}/{lon}",
                lat = point.latitude,
                lon = point.longitude
            ),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use model::{geo_point::GeoPoint, station::Station};

    use super::*;

    fn capture(id: i64, accuracy_meters: Option<f64>) -> WithId<CaptureRecord> {
        WithId::new(
            Id::new(id),
            CaptureRecord {
                station_id: Id::<Station>::new("STN-0000ABCD".to_owned()),
                point: GeoPoint {
                    latitude: 6.5,
                    longitude: 3.25,
                },
                accuracy_meters,
                captured_at: Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap(),
            },
        )
    }

    #[test]
    fn csv_has_header_and_one_line_per_capture() {
        let csv = captures_to_csv(&[capture(1, Some(8.0)), capture(2, None)]).unwrap();
        let csv = String::from_utf8(csv).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "id,station_id,latitude,longitude,accuracy_meters,captured_at",
                "1,STN-0000ABCD,6.5,3.25,8.0,2024-05-02T10:00:00+00:00",
                "2,STN-0000ABCD,6.5,3.25,,2024-05-02T10:00:00+00:00",
            ]
        );
    }

    #[test]
    fn empty_station_filter_is_ignored() {
        let filter = CapturesQuery {
            station: Some("  ".to_owned()),
            since: None,
        }
        .into_filter()
        .unwrap();
        assert!(filter.station.is_none());
    }

    #[test]
    fn malformed_station_filter_is_not_found() {
        let result = CapturesQuery {
            station: Some("not-a-station".to_owned()),
            since: None,
        }
        .into_filter();
        assert!(matches!(result, Err(RequestError::NotFound)));
    }
}

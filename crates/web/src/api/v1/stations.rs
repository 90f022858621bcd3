use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, on, post},
    Extension, Json, Router,
};
use axum_extra::TypedHeader;
use capture::{client::CaptureOutcome, database::CaptureFilter, RequestError};
use headers::UserAgent;
use model::{
    acquisition::GeolocationReport,
    capture::CaptureRecord,
    proximity::Decision,
    station::{NewStation, Station},
    WithId,
};
use schemars::JsonSchema;
use serde::Serialize;
use utility::{id::Id, let_also::LetAlso};

use super::captures::capture_hateoas;
use crate::{
    common::{
        route_not_found, schema, schema_no_example, HateoasResult, JsonBody,
        RouteErrorResponse, RouteResult, VecResponse, METHOD_FILTER_ALL,
    },
    hateoas,
    links::{self, ShareLinks},
    middleware::base_url::BaseUrl,
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/stations{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/schema", get(schema::<Station>))
        .route("/submission/schema", get(schema_no_example::<SubmissionDto>))
        .route("/", get(get_stations).post(create_station))
        .route("/:id", get(get_station))
        .route("/:id/links", get(get_links))
        .route(
            "/:id/captures",
            get(get_station_captures).post(submit_capture),
        )
        .route("/:id/captures/check", post(check_capture))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// Result of a capture attempt, accepted or not.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmissionDto {
    #[serde(flatten)]
    decision: Decision,
    message: String,
    threshold_meters: f64,
    capture: Option<hateoas::Response<WithId<CaptureRecord>>>,
}

impl SubmissionDto {
    fn new(decision: Decision, threshold_meters: f64, station: &Station) -> Self {
        let message = match decision {
            Decision::Accept => format!("Location captured for {}.", station.name),
            Decision::Reject { distance_meters } => format!(
                "This location was already captured {:.1} m away. Captures of {} must be at least {} m apart.",
                distance_meters, station.name, threshold_meters
            ),
        };
        Self {
            decision,
            message,
            threshold_meters,
            capture: None,
        }
    }
}

fn parse_station_id(
    id: &str,
    method: &Method,
    original_uri: &OriginalUri,
) -> RouteResult<Id<Station>> {
    Id::parse(id).ok_or_else(|| {
        RouteErrorResponse::from(RequestError::NotFound)
            .with_method(method)
            .with_uri(original_uri.path())
    })
}

async fn get_stations(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { capture_client, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<Station>>>> {
    capture_client
        .get_stations()
        .await
        .map(|stations| {
            stations
                .into_iter()
                .map(|station| station_hateoas(station, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::non_paginated(data).hateoas().json())
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn create_station(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { capture_client, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    JsonBody(station): JsonBody<NewStation>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<WithId<Station>>>)> {
    capture_client
        .create_station(station)
        .await
        .map(|station| (StatusCode::CREATED, station_hateoas(station, base_url).json()))
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })
}

async fn get_station(
    original_uri: OriginalUri,
    Path(id): Path<String>,
    State(WebState { capture_client, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<Station>> {
    let id = parse_station_id(&id, &Method::GET, &original_uri)?;
    capture_client
        .get_station(&id)
        .await
        .map(|station| station_hateoas(station, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn get_links(
    original_uri: OriginalUri,
    Path(id): Path<String>,
    State(WebState { capture_client, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<ShareLinks> {
    let id = parse_station_id(&id, &Method::GET, &original_uri)?;
    let station = capture_client.get_station(&id).await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })?;

    let share_links = links::share_links(&base_url, &id.raw(), &station.content.name)
        .map_err(|why| {
            RouteErrorResponse::from(RequestError::other(why))
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
                .with_message("Could not build share links for this station.")
        })?;

    Ok(hateoas::Response::builder(share_links, base_url)
        .link("self", resource!("/{}/links", id))
        .link("station", resource!("/{}", id))
        .build()
        .json())
}

async fn get_station_captures(
    original_uri: OriginalUri,
    Path(id): Path<String>,
    State(WebState { capture_client, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<CaptureRecord>>>> {
    let id = parse_station_id(&id, &Method::GET, &original_uri)?;
    capture_client
        .get_captures(CaptureFilter {
            station: Some(id),
            ..Default::default()
        })
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

async fn submit_capture(
    original_uri: OriginalUri,
    Path(id): Path<String>,
    State(WebState { capture_client, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    user_agent: Option<TypedHeader<UserAgent>>,
    JsonBody(report): JsonBody<GeolocationReport>,
) -> RouteResult<(StatusCode, Json<SubmissionDto>)> {
    let with_context = |why: RouteErrorResponse| {
        why.with_method(&Method::POST).with_uri(original_uri.path())
    };

    let id = parse_station_id(&id, &Method::POST, &original_uri)?;
    let station = capture_client
        .get_station(&id)
        .await
        .map_err(|why| with_context(why.into()))?;

    let accuracy = report.accuracy();
    let point = report.acquire().map_err(|why| {
        log::info!(
            "capture for station {} failed on the device: {} (user agent: {})",
            id,
            why,
            user_agent
                .as_ref()
                .map(|TypedHeader(user_agent)| user_agent.as_str())
                .unwrap_or("unknown")
        );
        with_context(why.into())
    })?;

    let threshold_meters = capture_client.threshold_meters();
    match capture_client.submit_capture(&id, point, accuracy).await {
        Ok(CaptureOutcome::Accepted(capture)) => {
            let mut submission =
                SubmissionDto::new(Decision::Accept, threshold_meters, &station.content);
            submission.capture = Some(capture_hateoas(capture, base_url));
            Ok((StatusCode::CREATED, Json(submission)))
        }
        Ok(CaptureOutcome::Rejected { distance_meters }) => Ok((
            StatusCode::OK,
            Json(SubmissionDto::new(
                Decision::Reject { distance_meters },
                threshold_meters,
                &station.content,
            )),
        )),
        Err(why) => Err(with_context(why.into())),
    }
}

async fn check_capture(
    original_uri: OriginalUri,
    Path(id): Path<String>,
    State(WebState { capture_client, .. }): State<WebState>,
    JsonBody(report): JsonBody<GeolocationReport>,
) -> RouteResult<Json<SubmissionDto>> {
    let with_context = |why: RouteErrorResponse| {
        why.with_method(&Method::POST).with_uri(original_uri.path())
    };

    let id = parse_station_id(&id, &Method::POST, &original_uri)?;
    let station = capture_client
        .get_station(&id)
        .await
        .map_err(|why| with_context(why.into()))?;
    let point = report.acquire().map_err(|why| with_context(why.into()))?;

    capture_client
        .evaluate(&id, &point)
        .await
        .map(|decision| {
            Json(SubmissionDto::new(
                decision,
                capture_client.threshold_meters(),
                &station.content,
            ))
        })
        .map_err(|why| with_context(why.into()))
}

pub(crate) fn station_hateoas(
    station: WithId<Station>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<WithId<Station>> {
    let capture_page = links::capture_url(&base_url, &station.id.raw());
    let id = station.id.clone();
    hateoas::Response::builder(station, base_url)
        .link("self", resource!("/{}", id))
        .link("captures", resource!("/{}/captures", id))
        .link("links", resource!("/{}/links", id))
        .action("submitCapture", Method::POST, resource!("/{}/captures", id))
        .action("checkCapture", Method::POST, resource!("/{}/captures/check", id))
        .link_extern("capturePage", capture_page)
        .build()
}

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::Method,
    routing::{get, on},
    Extension, Router,
};
use chrono::{DateTime, Local, Utc};
use model::capture::CaptureSummary;
use serde::Deserialize;
use utility::serde::date_time;

use crate::{
    common::{
        route_not_found, schema, HateoasResult, QueryParams, RouteErrorResponse,
        METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::BaseUrl,
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/dashboard{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/schema", get(schema::<CaptureSummary>))
        .route("/", get(dashboard))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardQuery {
    #[serde(deserialize_with = "date_time::deserialize_local_option", default)]
    since: Option<DateTime<Local>>,
}

/// Midnight of the current local day.
fn start_of_today() -> DateTime<Utc> {
    let now = Local::now();
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .unwrap_or(now)
        .with_timezone(&Utc)
}

async fn dashboard(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { capture_client, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    QueryParams(params): QueryParams<DashboardQuery>,
) -> HateoasResult<CaptureSummary> {
    let since = params
        .since
        .map(|since| since.with_timezone(&Utc))
        .unwrap_or_else(start_of_today);

    capture_client
        .summary(since)
        .await
        .map(|summary| {
            hateoas::Response::builder(summary, base_url)
                .link("self", resource!("/"))
                .link("stations", super::stations::resource!("/"))
                .link("captures", super::captures::resource!("/"))
                .link("export", super::captures::resource!("/export"))
                .build()
                .json()
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

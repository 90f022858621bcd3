use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, on},
    Extension, Json, Router,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{
    common::{route_not_found, schema_no_example, METHOD_FILTER_ALL},
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

mod captures;
mod dashboard;
mod stations;

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::resource!("/v1{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/schema", get(schema_no_example::<IndexDto>))
        .nest_service("/stations", stations::routes(state.clone()))
        .nest_service("/captures", captures::routes(state.clone()))
        .nest_service("/dashboard", dashboard::routes(state.clone()))
        .layer(axum::middleware::from_fn_with_state(
            state.config.clone(),
            base_url_middleware,
        ))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct IndexDto {
    version: &'static str,
    proximity_threshold_meters: f64,
}

async fn index(
    State(WebState { capture_client, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> Json<hateoas::Response<IndexDto>> {
    let index = IndexDto {
        version: "v1",
        proximity_threshold_meters: capture_client.threshold_meters(),
    };
    hateoas::Response::builder(index, base_url)
        .link("self", resource!("/"))
        .link("stations", stations::resource!("/"))
        .link("captures", captures::resource!("/"))
        .link("export", captures::resource!("/export"))
        .link("dashboard", dashboard::resource!("/"))
        .build()
        .json()
}

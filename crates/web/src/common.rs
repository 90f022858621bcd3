use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, OriginalUri, Query, Request,
    },
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::MethodFilter,
    Json,
};
use capture::RequestError;
use model::{acquisition::AcquisitionError, proximity::ProximityError, ExampleData};
use schemars::{schema_for, schema_for_value, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::hateoas;

pub type RouteResult<O> = Result<O, RouteErrorResponse>;
pub type HateoasResult<O> = RouteResult<Json<hateoas::Response<O>>>;

/// A `MethodFilter` that matches all http methods.
pub(crate) const METHOD_FILTER_ALL: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE);

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VecResponse<T> {
    pub data: Vec<T>,
    pub total_items: usize,
}

impl<T> VecResponse<T> {
    pub fn non_paginated(data: Vec<T>) -> Self {
        Self {
            total_items: data.len(),
            data,
        }
    }

    pub fn hateoas(self) -> hateoas::Response<Self> {
        hateoas::Response::new(self)
    }
}

/// `Json` that rejects malformed bodies with a [`RouteErrorResponse`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(RouteErrorResponse))]
pub struct JsonBody<T>(pub T);

/// `Query` that rejects malformed query strings with a [`RouteErrorResponse`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(RouteErrorResponse))]
pub struct QueryParams<T>(pub T);

// - Services returning commonly used responses -

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchemaParams {
    #[serde(default = "Default::default")]
    example_data: bool,
}

pub(crate) async fn schema<T: ExampleData + JsonSchema + Serialize>(
    QueryParams(params): QueryParams<SchemaParams>,
) -> impl IntoResponse {
    if params.example_data {
        Json(schema_for_value!(T::example_data()))
    } else {
        Json(schema_for!(T))
    }
}

pub(crate) async fn schema_no_example<T: JsonSchema + Serialize>(
    QueryParams(_params): QueryParams<SchemaParams>,
) -> impl IntoResponse {
    Json(schema_for!(T))
}

pub(crate) async fn route_not_found(
    OriginalUri(original_uri): OriginalUri,
    req: Request,
) -> impl IntoResponse {
    RouteErrorResponse::not_found(req.method(), original_uri.path())
}

// - Commonly used responeses -

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteErrorResponse {
    #[serde(skip)]
    pub status_code: StatusCode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_information: Option<String>,
}

impl RouteErrorResponse {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            http_method: None,
            requested_uri: None,
            message: None,
            detailed_information: None,
        }
    }

    pub fn not_found(method: &Method, uri: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND)
            .with_method(method)
            .with_uri(uri)
            .with_default_message()
    }

    pub fn with_method(mut self, method: &Method) -> Self {
        self.http_method = Some(method.to_string());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.requested_uri = Some(uri.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_default_message(self) -> Self {
        let message = self
            .status_code
            .canonical_reason()
            .unwrap_or("i dunno what happened here :/");
        self.with_message(message)
    }

    pub fn with_detailed_information(mut self, message: impl Into<String>) -> Self {
        self.detailed_information = Some(message.into());
        self
    }
}

impl From<RequestError> for RouteErrorResponse {
    fn from(value: RequestError) -> Self {
        match value {
            RequestError::NotFound => Self::new(StatusCode::NOT_FOUND)
                .with_message("The requested item does not exist."),
            RequestError::InvalidInput(message) => {
                Self::new(StatusCode::BAD_REQUEST).with_message(message)
            }
            RequestError::Proximity(why @ ProximityError::InvalidPoint(_)) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY)
                    .with_message("The reported position is not a valid coordinate.")
                    .with_detailed_information(why.to_string())
            }
            RequestError::Proximity(why @ ProximityError::InvalidThreshold(_)) => {
                log::error!("misconfigured proximity check: {}", why);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR).with_default_message()
            }
            RequestError::Other(other) => {
                log::error!("request failed: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR)
                    .with_default_message()
                    .with_detailed_information(other.to_string())
            }
        }
    }
}

impl From<AcquisitionError> for RouteErrorResponse {
    fn from(value: AcquisitionError) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY)
            .with_message("No position could be determined for this capture.")
            .with_detailed_information(value.to_string())
    }
}

impl From<JsonRejection> for RouteErrorResponse {
    fn from(value: JsonRejection) -> Self {
        Self::new(value.status())
            .with_message("The request body could not be read.")
            .with_detailed_information(value.body_text())
    }
}

impl From<QueryRejection> for RouteErrorResponse {
    fn from(value: QueryRejection) -> Self {
        Self::new(value.status())
            .with_message("The query string could not be read.")
            .with_detailed_information(value.body_text())
    }
}

impl IntoResponse for RouteErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use model::geo_point::GeoPoint;

    use super::*;

    #[test]
    fn request_errors_map_to_status_codes() {
        let invalid_point = GeoPoint {
            latitude: 95.0,
            longitude: 0.0,
        }
        .validate()
        .unwrap_err();

        let cases = [
            (RequestError::NotFound, StatusCode::NOT_FOUND),
            (
                RequestError::InvalidInput("no name".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (
                RequestError::Proximity(invalid_point.into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                RequestError::Proximity(ProximityError::InvalidThreshold(-1.0)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status_code) in cases {
            assert_eq!(RouteErrorResponse::from(error).status_code, status_code);
        }
    }

    #[test]
    fn acquisition_errors_are_unprocessable() {
        let response = RouteErrorResponse::from(AcquisitionError::PermissionDenied);
        assert_eq!(response.status_code, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.detailed_information.as_deref(),
            Some("location permission was denied on the device")
        );
    }

    #[test]
    fn malformed_query_is_a_bad_request() {
        let uri: axum::http::Uri = "/schema?exampleData=maybe".parse().unwrap();
        let rejection = Query::<SchemaParams>::try_from_uri(&uri).unwrap_err();

        let response = RouteErrorResponse::from(rejection);
        assert_eq!(response.status_code, StatusCode::BAD_REQUEST);
        assert!(response.message.is_some());
        assert!(response
            .detailed_information
            .as_deref()
            .is_some_and(|details| details.starts_with("Failed to deserialize query string")));
    }
}

use axum::{
    extract::{self, State},
    http::HeaderMap,
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::config::Config;

/// Public root of the service, e.g. `https://capture.example.org/prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    root: String,
}

impl BaseUrl {
    pub fn new(root: impl Into<String>) -> Self {
        let root: String = root.into();
        Self {
            root: root.trim_end_matches('/').to_owned(),
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        let proto = header("x-forwarded-proto").unwrap_or("http");
        let host = header("x-forwarded-host")
            .or_else(|| header("host"))
            .unwrap_or("localhost");
        let prefix = header("x-forwarded-prefix").unwrap_or("");

        Self::new(format!("{}://{}{}", proto, host, prefix))
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn full_url<S: Into<String>>(&self, path: S) -> String {
        format!("{}{}", self.root, path.into())
    }
}

pub async fn base_url_middleware(
    State(config): State<Arc<Config>>,
    req: extract::Request,
    next: Next,
) -> impl IntoResponse {
    let base_url = match &config.public_base_url {
        Some(public_base_url) => BaseUrl::new(public_base_url.as_str()),
        None => BaseUrl::from_headers(req.headers()),
    };

    let mut req = req;
    req.extensions_mut().insert(Arc::new(base_url));

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn forwarded_headers_take_precedence_over_host() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("10.0.0.3:8080"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("capture.example.org"));
        headers.insert("x-forwarded-prefix", HeaderValue::from_static("/stations"));

        let base_url = BaseUrl::from_headers(&headers);
        assert_eq!(
            base_url.full_url("/capture.html"),
            "https://capture.example.org/stations/capture.html"
        );
    }

    #[test]
    fn falls_back_to_plain_http_on_localhost() {
        assert_eq!(
            BaseUrl::from_headers(&HeaderMap::new()).root(),
            "http://localhost"
        );
    }

    #[test]
    fn trailing_slash_is_dropped() {
        assert_eq!(
            BaseUrl::new("https://example.org/").full_url("/api/ping"),
            "https://example.org/api/ping"
        );
    }
}

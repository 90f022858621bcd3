//! Responses that carry links to related resources next to their content.

use std::sync::Arc;

use axum::{http::Method, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::middleware::base_url::BaseUrl;

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Link {
    #[serde(rename = "rel")]
    pub relation: String,

    #[serde(rename = "href")]
    pub hypertext_reference: String,

    /// Only set for links that are not followed with `GET`.
    pub method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Response<T> {
    #[serde(flatten)]
    pub content: T,
    pub links: Vec<Link>,
}

impl<T> Response<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            links: vec![],
        }
    }

    pub fn builder(content: T, base_url: Arc<BaseUrl>) -> ResponseBuilder<T> {
        ResponseBuilder {
            response: Self::new(content),
            base_url,
        }
    }

    pub fn json(self) -> Json<Self> {
        Json(self)
    }
}

pub struct ResponseBuilder<T> {
    response: Response<T>,
    base_url: Arc<BaseUrl>,
}

impl<T> ResponseBuilder<T> {
    /// Link to a path below the public root of this service.
    pub fn link(self, relation: impl Into<String>, path: impl Into<String>) -> Self {
        let href = self.base_url.full_url(path);
        self.push(relation.into(), href, None)
    }

    /// Like [`ResponseBuilder::link`], for resources that are used with
    /// another method than `GET`.
    pub fn action(
        self,
        relation: impl Into<String>,
        method: Method,
        path: impl Into<String>,
    ) -> Self {
        let href = self.base_url.full_url(path);
        self.push(relation.into(), href, Some(method))
    }

    pub fn link_extern(self, relation: impl Into<String>, href: impl Into<String>) -> Self {
        self.push(relation.into(), href.into(), None)
    }

    fn push(mut self, relation: String, href: String, method: Option<Method>) -> Self {
        self.response.links.push(Link {
            relation,
            hypertext_reference: href,
            method: method.map(|method| method.to_string()),
        });
        self
    }

    pub fn build(self) -> Response<T> {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn links_are_serialized_next_to_content() {
        let base_url = Arc::new(BaseUrl::new("https://capture.example.org"));
        let response = Response::builder(json!({ "name": "Ikeja" }), base_url)
            .link("self", "/api/v1/stations/STN-0000000A")
            .action("submit", Method::POST, "/api/v1/stations/STN-0000000A/captures")
            .link_extern("map", "https://www.openstreetmap.org/")
            .build();

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({
                "name": "Ikeja",
                "links": [
                    { "rel": "self", "href": "https://capture.example.org/api/v1/stations/STN-0000000A" },
                    {
                        "rel": "submit",
                        "href": "https://capture.example.org/api/v1/stations/STN-0000000A/captures",
                        "method": "POST"
                    },
                    { "rel": "map", "href": "https://www.openstreetmap.org/" },
                ]
            })
        );
    }
}

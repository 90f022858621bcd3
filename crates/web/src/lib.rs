pub use crate::common::RouteResult;

use std::sync::Arc;

use axum::{extract::FromRef, Router};
use capture::client::Client;
use database::SqliteDatabase;
use tokio::net::TcpListener;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

pub mod api;
pub mod common;
pub mod config;
pub mod hateoas;
pub mod links;
pub mod middleware;

#[derive(Clone, FromRef)]
pub struct WebState {
    pub capture_client: Client<SqliteDatabase>,
    pub config: Arc<Config>,
}

/// The complete application: json api below `/api`, static pages everywhere
/// else.
pub fn app(state: WebState) -> Router {
    let static_dir = state.config.static_dir.clone();
    Router::new()
        .nest_service("/api", api::routes(state))
        .fallback_service(
            ServeDir::new(&static_dir)
                .not_found_service(ServeFile::new(static_dir.join("error404.html"))),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

pub async fn start_web_server(state: WebState) -> std::io::Result<()> {
    let bind_address = state.config.bind_address;
    let routes = app(state);

    let listener = TcpListener::bind(bind_address).await?;
    log::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}


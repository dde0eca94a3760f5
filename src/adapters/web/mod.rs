//! Web server adapter.
//!
//! Serves the dashboard over HTTP. Every request re-reads both sources, so
//! changes to the CSV files show up on the next page load.

mod error;
mod handlers;

pub use error::WebError;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::config_validation::Settings;
use crate::ports::series_port::SeriesPort;

pub struct AppState {
    pub series_port: Arc<dyn SeriesPort + Send + Sync>,
    pub settings: Settings,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

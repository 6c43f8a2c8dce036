//! Route definitions for the repogen web server

use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Routes served at the root
pub fn root_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(handlers::analyze_repository))
}

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Analysis
        .route("/analyze", post(handlers::analyze_repository))
        // Configuration
        .route("/config", get(handlers::get_config))
        // API description
        .route("/openapi.json", get(handlers::openapi_spec))
}

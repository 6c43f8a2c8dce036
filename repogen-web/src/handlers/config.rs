//! Configuration and API description handlers

use super::types::ConfigResponse;
use crate::{openapi::ApiDoc, AppState};
use axum::{extract::State, response::Json};
use utoipa::OpenApi;

/// Get server configuration
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "Configuration",
    summary = "Get server configuration",
    description = "Settings that affect analyses; nothing secret is included",
    responses(
        (status = 200, description = "Configuration retrieved successfully", body = ConfigResponse)
    )
)]
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let config = &state.config;
    Json(ConfigResponse {
        host: config.server.host.clone(),
        port: config.server.port,
        allowed_origins: config.server.allowed_origins.clone(),
        max_concurrent_analyses: config.server.max_concurrent_analyses,
        clone_depth: config.repository.clone_depth,
        tree_max_depth: config.readme.tree_max_depth,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// OpenAPI document for this server
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

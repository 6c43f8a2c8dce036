//! Request and response types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use repogen_core::RepogenError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Analyze request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    #[schema(example = "https://github.com/owner/repo")]
    pub github_url: String,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// Non-secret server settings
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ConfigResponse {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_concurrent_analyses: usize,
    /// 0 means full history
    pub clone_depth: u32,
    pub tree_max_depth: usize,
    pub version: String,
}

/// Error body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

/// An error rendered as `{ "detail": ... }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<RepogenError> for ApiError {
    fn from(error: RepogenError) -> Self {
        let status = match &error {
            RepogenError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

//! Repository analysis handler

use super::types::{AnalyzeRequest, ApiError, ErrorResponse};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use repogen_artifacts::AnalysisReport;
use tracing::{info, warn};

/// Clone a repository and generate every artifact for it
#[utoipa::path(
    post,
    path = "/analyze",
    tag = "Analysis",
    summary = "Analyze a repository",
    description = "Clone the repository and return its README, requirements.txt, documentation, .gitignore and analytics. Also served at /api/analyze.",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis completed", body = AnalysisReport),
        (status = 422, description = "Not a remote repository URL", body = ErrorResponse),
        (status = 500, description = "Clone or generation failed", body = ErrorResponse)
    )
)]
pub async fn analyze_repository(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, ApiError> {
    info!(github_url = %request.github_url, "Analyze request received");

    let _permit = state.analysis_permits.acquire().await.map_err(|_| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Server is shutting down",
        )
    })?;

    // Network URLs only unless configured: server paths are not exposed by default
    let allow_local = state.config.server.allow_local_sources;
    match state.pipeline.analyze(&request.github_url, allow_local).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            if e.is_client_error() {
                warn!(github_url = %request.github_url, error = %e, "Rejected analyze request");
            } else {
                e.log();
            }
            Err(ApiError::from(e))
        }
    }
}

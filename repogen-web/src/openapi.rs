//! OpenAPI specification for the repogen web server

use utoipa::OpenApi;

use crate::handlers::{AnalyzeRequest, ConfigResponse, ErrorResponse, HealthResponse};
use repogen_artifacts::{
    AnalysisReport, Analytics, Artifacts, HealthCheck, HealthReport, TreeSummary,
};

/// Main OpenAPI specification for the repogen web server
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Repogen Web API",
        version = "0.1.0",
        description = "Generate README, requirements.txt, docs and .gitignore for a Git repository",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::analyze_repository,
        crate::handlers::get_config,
    ),
    components(
        schemas(
            AnalyzeRequest,
            AnalysisReport,
            Artifacts,
            Analytics,
            TreeSummary,
            HealthReport,
            HealthCheck,
            ErrorResponse,
            HealthResponse,
            ConfigResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Analysis", description = "Repository analysis"),
        (name = "Configuration", description = "Server configuration"),
    )
)]
pub struct ApiDoc;

/// Get the OpenAPI specification as JSON
pub fn get_openapi_json() -> serde_json::Result<String> {
    ApiDoc::openapi().to_pretty_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Repogen Web API");
        assert!(openapi.paths.paths.contains_key("/analyze"));
        assert!(openapi.paths.paths.contains_key("/api/health"));
    }

    #[test]
    fn test_openapi_json() {
        let json = get_openapi_json().unwrap();
        assert!(json.contains("AnalysisReport"));
        assert!(json.contains("github_url"));
    }
}

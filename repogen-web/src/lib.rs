//! Repogen Web Server
//!
//! HTTP front end for the analysis pipeline: `POST /analyze` clones a
//! repository and answers with every generated artifact.

pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use server::{RepogenServer, RepogenServerBuilder};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    Router,
};
use repogen_core::{RepogenConfig, RepogenError, ServerConfig};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Request bodies are tiny JSON documents
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);

    Router::new()
        // The original endpoint, kept at the root for existing clients
        .merge(routes::root_routes())
        .nest("/api", routes::api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Any origin when `allowed_origins` is empty, otherwise exactly the listed ones
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}

/// Bind settings for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self::from_server_config(&ServerConfig::default())
    }
}

impl WebConfig {
    pub fn from_server_config(server: &ServerConfig) -> Self {
        Self {
            host: server.host.clone(),
            port: server.port,
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Apply `REPOGEN_HOST`, `REPOGEN_PORT` and `REPOGEN_CLONE_DIR`
pub fn apply_env_overrides(config: &mut RepogenConfig) {
    if let Ok(host) = std::env::var("REPOGEN_HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("REPOGEN_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(value = %port, "Ignoring invalid REPOGEN_PORT"),
        }
    }
    if let Ok(dir) = std::env::var("REPOGEN_CLONE_DIR") {
        config.repository.clone_base_dir = dir;
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Repogen(#[from] RepogenError),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

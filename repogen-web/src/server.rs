//! Repogen Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use repogen_core::RepogenConfig;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main repogen web server
pub struct RepogenServer {
    config: WebConfig,
    state: AppState,
}

impl RepogenServer {
    /// Validate `config` and build the server state
    pub fn new(config: RepogenConfig) -> WebResult<Self> {
        config
            .validate()
            .map_err(|e| WebError::Config(e.to_string()))?;

        Ok(Self {
            config: WebConfig::from_server_config(&config.server),
            state: AppState::new(config),
        })
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> WebResult<()> {
        self.start_with_shutdown(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn start_with_shutdown<F>(self, shutdown: F) -> WebResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let address = self.config.address();

        info!("🚀 Starting repogen web server");
        info!("📍 Server address: http://{}", address);

        let app = create_app(self.state.clone());
        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).with_graceful_shutdown(shutdown).await {
            error!("❌ Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("👋 Server shut down gracefully");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Builder for RepogenServer
pub struct RepogenServerBuilder {
    config: RepogenConfig,
}

impl RepogenServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: RepogenConfig::default(),
        }
    }

    /// Start from a loaded configuration
    pub fn config(mut self, config: RepogenConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Build the server
    pub fn build(self) -> WebResult<RepogenServer> {
        RepogenServer::new(self.config)
    }
}

impl Default for RepogenServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_bind_address() {
        let server = RepogenServerBuilder::new()
            .host("0.0.0.0")
            .port(9100)
            .build()
            .unwrap();
        assert_eq!(server.config().address(), "0.0.0.0:9100");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = RepogenConfig::default();
        config.server.max_concurrent_analyses = 0;
        let result = RepogenServerBuilder::new().config(config).build();
        assert!(matches!(result, Err(WebError::Config(_))));
    }

    #[tokio::test]
    async fn stops_when_shutdown_resolves() {
        let server = RepogenServerBuilder::new().port(0).build().unwrap();
        server.start_with_shutdown(async {}).await.unwrap();
    }
}

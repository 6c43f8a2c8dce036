//! Shared application state

use repogen_artifacts::AnalysisPipeline;
use repogen_core::RepogenConfig;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::info;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration after file, env and CLI overrides
    pub config: Arc<RepogenConfig>,
    pub pipeline: Arc<AnalysisPipeline>,
    /// Caps the number of analyses running at once
    pub analysis_permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: RepogenConfig) -> Self {
        let pipeline = AnalysisPipeline::new(&config);
        Self::with_pipeline(config, pipeline)
    }

    pub fn with_pipeline(config: RepogenConfig, pipeline: AnalysisPipeline) -> Self {
        let permits = config.server.max_concurrent_analyses.max(1);
        info!(
            clone_base_dir = %config.repository.clone_base_dir,
            max_concurrent_analyses = permits,
            "Initialized application state"
        );

        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            analysis_permits: Arc::new(Semaphore::new(permits)),
        }
    }
}

//! Analysis pipeline
//!
//! One call takes a repository location through every generator:
//! acquire working copy, requirements, README, docs, .gitignore, analytics.
//! Only acquisition and the README can fail the whole analysis; the other
//! artifacts fold their failures into their text.

use crate::docs::DocsGenerator;
use crate::gitignore::GitignoreGenerator;
use crate::readme::ReadmeGenerator;
use crate::requirements::{RequirementsGenerator, ERROR_PREFIX};
use crate::tool::CommandRunner;
use crate::types::{AnalysisReport, Artifacts};
use repogen_core::{
    performance::measure_async, validation_error, ErrorContext, RepogenConfig, RepogenError,
    RepogenResult,
};
use repogen_repo::{RepoLocation, RepositoryProcessor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::OwnedMutexGuard;
use tracing::{info, warn};

type CloneLocks = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

pub const DOCS_FAILED_PREFIX: &str = "# Documentation generation failed: ";
pub const GITIGNORE_FAILED_PREFIX: &str = "# .gitignore generation failed: ";

/// Runs every generator for one repository
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    processor: RepositoryProcessor,
    requirements: RequirementsGenerator,
    readme: ReadmeGenerator,
    docs: DocsGenerator,
    gitignore: GitignoreGenerator,
    /// One lock per clone directory name, removed once nobody holds or awaits it
    clone_locks: CloneLocks,
}

impl AnalysisPipeline {
    pub fn new(config: &RepogenConfig) -> Self {
        let excluded = config.repository.excluded_dirs.clone();
        Self {
            processor: RepositoryProcessor::from_config(&config.repository),
            requirements: RequirementsGenerator::new(&config.tools),
            readme: ReadmeGenerator::new(config.readme.clone())
                .with_excluded_dirs(excluded.clone()),
            docs: DocsGenerator::new(excluded.clone()),
            gitignore: GitignoreGenerator::new(excluded),
            clone_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_processor(mut self, processor: RepositoryProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn with_command_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.requirements = self.requirements.with_runner(runner);
        self
    }

    pub fn processor(&self) -> &RepositoryProcessor {
        &self.processor
    }

    /// Parse `input` and analyze it
    ///
    /// Local paths and `file://` URLs are rejected with a validation error
    /// unless `allow_local`.
    pub async fn analyze(&self, input: &str, allow_local: bool) -> RepogenResult<AnalysisReport> {
        let location = RepoLocation::parse(input)?;
        if !location.is_network() && !allow_local {
            return Err(validation_error!(
                format!("Not a remote repository URL: {}", input.trim()),
                "github_url",
                "analysis_pipeline"
            ));
        }
        self.analyze_location(&location).await
    }

    pub async fn analyze_location(&self, location: &RepoLocation) -> RepogenResult<AnalysisReport> {
        let start = Instant::now();
        info!(repo = %location.name(), remote = location.is_remote(), "🔍 Starting analysis");

        // Held until the report is built so a concurrent clone of the same
        // name cannot delete the working copy mid-analysis
        let _guard = match location {
            RepoLocation::Remote { name, .. } => Some(self.lock_name(name).await),
            RepoLocation::Local { .. } => None,
        };

        let repo_path = self.processor.acquire(location).await?;
        let report = match location {
            RepoLocation::Remote { .. } => self.generate(&repo_path).await?,
            RepoLocation::Local { .. } => self.generate_preserving(&repo_path).await?,
        };

        info!(
            repo = %location.name(),
            duration_ms = start.elapsed().as_millis(),
            health = report.analytics.health.score,
            "✅ Analysis completed"
        );
        Ok(report)
    }

    /// Produce every artifact for a working copy this pipeline owns
    ///
    /// `requirements.txt` is (re)written inside `repo_path`.
    pub async fn generate(&self, repo_path: &Path) -> RepogenResult<AnalysisReport> {
        let requirements = measure_async(
            "requirements",
            self.requirements.generate(repo_path),
        )
        .await;
        self.generate_rest(repo_path, requirements).await
    }

    /// Produce every artifact for a user's checkout without writing into it
    pub async fn generate_preserving(&self, repo_path: &Path) -> RepogenResult<AnalysisReport> {
        let requirements = match tempfile::tempdir() {
            Ok(scratch) => {
                measure_async(
                    "requirements",
                    self.requirements.generate_to(repo_path, scratch.path()),
                )
                .await
            }
            Err(e) => format!("{}{}", ERROR_PREFIX, e),
        };
        self.generate_rest(repo_path, requirements).await
    }

    async fn generate_rest(
        &self,
        repo_path: &Path,
        requirements: String,
    ) -> RepogenResult<AnalysisReport> {
        let readme = {
            let generator = self.readme.clone();
            let path = repo_path.to_path_buf();
            measure_async(
                "readme",
                run_blocking("readme", move || generator.generate(&path)),
            )
            .await??
        };

        let documentation = {
            let generator = self.docs.clone();
            let path = repo_path.to_path_buf();
            let task = run_blocking("docs", move || generator.generate(&path));
            match measure_async("docs", task).await {
                Ok(Ok(text)) => text,
                Ok(Err(e)) | Err(e) => {
                    warn!(error = %e, "Documentation generation failed");
                    format!("{}{}", DOCS_FAILED_PREFIX, e)
                }
            }
        };

        let gitignore = {
            let generator = self.gitignore.clone();
            let path = repo_path.to_path_buf();
            let task = run_blocking("gitignore", move || generator.generate(&path));
            match measure_async("gitignore", task).await {
                Ok(Ok(text)) => text,
                Ok(Err(e)) | Err(e) => {
                    warn!(error = %e, ".gitignore generation failed");
                    format!("{}{}", GITIGNORE_FAILED_PREFIX, e)
                }
            }
        };

        Ok(AnalysisReport::new(
            repo_path,
            Artifacts {
                requirements,
                readme,
                documentation,
                gitignore,
            },
        ))
    }

    async fn lock_name(&self, name: &str) -> NameGuard {
        let lock = {
            let mut locks = self.clone_locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks
                .entry(name.to_string())
                .or_default()
                .clone()
        };
        NameGuard {
            name: name.to_string(),
            locks: self.clone_locks.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Where a remote with this name would be cloned
    pub fn clone_destination(&self, name: &str) -> PathBuf {
        self.processor.clone_destination(name)
    }
}

/// Holds one name's lock and drops the map entry when it was the last user
struct NameGuard {
    name: String,
    locks: CloneLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for NameGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.name)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.name);
        }
    }
}

async fn run_blocking<F, T>(operation: &str, f: F) -> RepogenResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RepogenError::Internal {
            message: format!("{} task failed: {}", operation, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("analysis_pipeline").with_operation(operation),
        })
}

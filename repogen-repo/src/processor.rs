//! Repository Processor
//!
//! Obtains a working copy for a [`RepoLocation`]:
//! - Remote: cloned into `<base_path>/<name>`, replacing any previous clone
//! - Local: validated and used in place

use crate::location::RepoLocation;
use futures::FutureExt;
use repogen_core::{
    not_found_error, retry_async, with_timeout, ErrorContext, RepogenError, RepogenResult,
    RepositoryConfig, RetryConfig,
};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;

/// Knobs for `git clone`
#[derive(Debug, Clone)]
pub struct CloneOptions {
    /// 0 = full history
    pub depth: u32,
    pub timeout_secs: u64,
    /// Extra attempts after a failed clone
    pub retries: usize,
    /// Token injected into `https://github.com/...` URLs
    pub access_token: Option<String>,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            depth: 1,
            timeout_secs: 300,
            retries: 2,
            access_token: std::env::var("GITHUB_TOKEN").ok(),
        }
    }
}

impl From<&RepositoryConfig> for CloneOptions {
    fn from(config: &RepositoryConfig) -> Self {
        Self {
            depth: config.clone_depth,
            timeout_secs: config.clone_timeout_secs,
            retries: config.clone_retries,
            ..Self::default()
        }
    }
}

/// Repository processor - the entry point for getting a working copy
#[derive(Debug, Clone)]
pub struct RepositoryProcessor {
    /// Directory that receives clones
    base_path: PathBuf,
    options: CloneOptions,
}

impl RepositoryProcessor {
    /// Create a processor with default clone options
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            options: CloneOptions::default(),
        }
    }

    pub fn from_config(config: &RepositoryConfig) -> Self {
        Self {
            base_path: PathBuf::from(&config.clone_base_dir),
            options: CloneOptions::from(config),
        }
    }

    pub fn with_options(mut self, options: CloneOptions) -> Self {
        self.options = options;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Where a remote named `name` is cloned to
    pub fn clone_destination(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Clone or open `location`, returning the working-copy path
    pub async fn acquire(&self, location: &RepoLocation) -> RepogenResult<PathBuf> {
        match location {
            RepoLocation::Remote { url, name } => self.clone_repository(url, name).await,
            RepoLocation::Local { path, .. } => self.open_local(path).await,
        }
    }

    /// Validate a local directory and return its canonical path
    pub async fn open_local(&self, path: &Path) -> RepogenResult<PathBuf> {
        debug!(local_path = %path.display(), "Opening local directory");

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| not_found_error!(path.display(), "repository_processor"))?;

        if !metadata.is_dir() {
            return Err(RepogenError::Repository {
                message: format!("Not a directory: {}", path.display()),
                source: None,
                context: ErrorContext::new("repository_processor")
                    .with_operation("open_local")
                    .with_suggestion("Pass the repository root directory"),
            });
        }

        Ok(tokio::fs::canonicalize(path).await?)
    }

    /// Clone `url` into `<base_path>/<name>`, removing any previous clone first
    pub async fn clone_repository(&self, url: &str, name: &str) -> RepogenResult<PathBuf> {
        let target_path = self.clone_destination(name);
        let clone_url = authenticated_url(url, self.options.access_token.as_deref());

        info!(
            repo_url = %url,
            target_path = %target_path.display(),
            "🚀 Starting repository clone"
        );

        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| RepogenError::Repository {
                message: format!("Failed to create clone directory: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("repository_processor")
                    .with_operation("clone_repository")
                    .with_metadata("base_path", &self.base_path.display().to_string()),
            })?;

        let depth = self.options.depth;
        let timeout_ms = self.options.timeout_secs.saturating_mul(1000);
        let token = self.options.access_token.clone();

        let operation = || {
            let clone_url = clone_url.clone();
            let target_path = target_path.clone();
            let token = token.clone();
            async move {
                remove_existing(&target_path).await?;
                with_timeout(
                    run_git_clone(&clone_url, &target_path, depth, token.as_deref()),
                    timeout_ms,
                    "git_clone",
                )
                .await?
            }
            .boxed()
        };

        retry_async(
            operation,
            RetryConfig::with_retries(self.options.retries),
            "clone_repository",
        )
        .await?;

        info!(
            repo_url = %url,
            target_path = %target_path.display(),
            "✅ Repository cloned successfully"
        );

        Ok(target_path)
    }
}

/// Inject `token` as the user part of `https://github.com/...` URLs
pub fn authenticated_url(url: &str, token: Option<&str>) -> String {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return url.to_string();
    };

    match Url::parse(url) {
        Ok(mut parsed)
            if parsed.scheme() == "https"
                && parsed.host_str() == Some("github.com")
                && parsed.username().is_empty() =>
        {
            if parsed.set_username(token).is_ok() {
                parsed.to_string()
            } else {
                url.to_string()
            }
        }
        _ => url.to_string(),
    }
}

async fn remove_existing(path: &Path) -> RepogenResult<()> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Removing previous clone");
        tokio::fs::remove_dir_all(path)
            .await
            .map_err(|e| RepogenError::Repository {
                message: format!("Failed to remove existing directory: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("repository_processor")
                    .with_operation("remove_existing")
                    .with_metadata("path", &path.display().to_string()),
            })?;
    }
    Ok(())
}

async fn run_git_clone(
    url: &str,
    target_path: &Path,
    depth: u32,
    token: Option<&str>,
) -> RepogenResult<()> {
    let mut cmd = Command::new("git");
    cmd.arg("clone");

    if depth > 0 {
        cmd.arg("--depth").arg(depth.to_string());
        cmd.arg("--single-branch");
    }

    cmd.arg("--")
        .arg(url)
        .arg(target_path)
        .env("GIT_TERMINAL_PROMPT", "0")
        .kill_on_drop(true);

    let output = cmd.output().await.map_err(|e| RepogenError::Repository {
        message: format!("Failed to execute git clone: {}", e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("repository_processor")
            .with_operation("clone_repository")
            .with_suggestion("Ensure git is installed and accessible"),
    })?;

    if !output.status.success() {
        let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            stderr = stderr.replace(token, "***");
        }
        return Err(RepogenError::Clone {
            message: format!("Failed to clone repo: {}", stderr),
            source: None,
            context: ErrorContext::new("repository_processor")
                .with_operation("clone_repository")
                .with_suggestion("Check repository URL and access permissions"),
        });
    }

    Ok(())
}

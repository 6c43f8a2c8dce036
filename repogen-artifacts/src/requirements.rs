//! `requirements.txt` generation through `pipreqs`
//!
//! Failures never abort an analysis: they are rendered into the returned
//! text as a `# Error generating requirements.txt: ...` comment line.

use crate::tool::{CommandRunner, SystemCommandRunner};
use repogen_core::{RepogenError, ToolsConfig};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const REQUIREMENTS_FILE: &str = "requirements.txt";
pub const NO_IMPORTS: &str = "# No imports found in the repository.";
pub const ERROR_PREFIX: &str = "# Error generating requirements.txt: ";

/// Why `pipreqs` produced nothing usable
#[derive(Error, Debug)]
pub enum RequirementsError {
    #[error("pipreqs is not installed. Please install it with 'pip install pipreqs'.")]
    NotInstalled,

    #[error("pipreqs error: {0}")]
    ToolFailed(String),

    #[error("requirements.txt was not generated. The repo may not have any imports.")]
    NotGenerated,

    #[error("{0}")]
    Other(String),
}

/// Runs `pipreqs` against a working copy
#[derive(Clone)]
pub struct RequirementsGenerator {
    runner: Arc<dyn CommandRunner>,
    command: String,
    timeout_secs: u64,
}

impl std::fmt::Debug for RequirementsGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequirementsGenerator")
            .field("command", &self.command)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl RequirementsGenerator {
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            runner: Arc::new(SystemCommandRunner),
            command: config.pipreqs_command.clone(),
            timeout_secs: config.tool_timeout_secs,
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Contents of the generated file, or a comment describing the failure
    ///
    /// The file is written to `<root>/requirements.txt`, replacing any existing one.
    pub async fn generate(&self, root: &Path) -> String {
        self.generate_to(root, root).await
    }

    /// Like [`generate`](Self::generate) but writes into `save_dir`, leaving `root` untouched
    pub async fn generate_to(&self, root: &Path, save_dir: &Path) -> String {
        match self.try_generate(root, &save_dir.join(REQUIREMENTS_FILE)).await {
            Ok(content) if content.is_empty() => NO_IMPORTS.to_string(),
            Ok(content) => {
                info!(
                    root = %root.display(),
                    packages = content.lines().count(),
                    "Generated requirements.txt"
                );
                content
            }
            Err(e) => {
                warn!(root = %root.display(), error = %e, "requirements.txt generation failed");
                format!("{}{}", ERROR_PREFIX, e)
            }
        }
    }

    async fn try_generate(&self, root: &Path, save_path: &Path) -> Result<String, RequirementsError> {
        let args = vec![
            root.display().to_string(),
            "--force".to_string(),
            "--savepath".to_string(),
            save_path.display().to_string(),
        ];

        let output = self
            .runner
            .run(&self.command, &args, self.timeout_secs)
            .await
            .map_err(|e| match e {
                RepogenError::NotFound { .. } => RequirementsError::NotInstalled,
                other => RequirementsError::Other(other.to_string()),
            })?;

        if !output.success {
            if output.stderr.contains("No module named pipreqs") {
                return Err(RequirementsError::NotInstalled);
            }
            return Err(RequirementsError::ToolFailed(output.stderr.trim().to_string()));
        }

        match tokio::fs::read(save_path).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RequirementsError::NotGenerated)
            }
            Err(e) => Err(RequirementsError::Other(e.to_string())),
        }
    }
}

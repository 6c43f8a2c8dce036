//! Report types shared by the CLI and the HTTP service

use crate::analytics::Analytics;
use repogen_core::{ErrorContext, RepogenError, RepogenResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use utoipa::ToSchema;

pub const ANALYSIS_COMPLETED: &str = "Analysis completed";

/// The four generated text artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Artifacts {
    /// `requirements.txt` contents, or an error comment
    pub requirements: String,
    /// Generated `README.md`
    pub readme: String,
    /// Markdown API docs for the Python modules
    pub documentation: String,
    /// `.gitignore` template for the detected stack
    pub gitignore: String,
}

/// Result of analyzing one repository
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisReport {
    #[schema(example = "Analysis completed")]
    pub message: String,
    /// Working copy the artifacts were generated from
    pub repo_path: String,
    #[serde(flatten)]
    pub artifacts: Artifacts,
    pub analytics: Analytics,
}

impl AnalysisReport {
    pub fn new(repo_path: &Path, artifacts: Artifacts) -> Self {
        let analytics = Analytics::from_artifacts(&artifacts);
        Self {
            message: ANALYSIS_COMPLETED.to_string(),
            repo_path: repo_path.display().to_string(),
            artifacts,
            analytics,
        }
    }

    /// Write every artifact into `dir`, creating it if needed
    pub async fn write_to(&self, dir: &Path) -> RepogenResult<Vec<PathBuf>> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| write_error(dir, e))?;

        let analytics = serde_json::to_string_pretty(&self.analytics)?;
        let files = [
            ("README.md", self.artifacts.readme.as_str()),
            ("requirements.txt", self.artifacts.requirements.as_str()),
            ("DOCUMENTATION.md", self.artifacts.documentation.as_str()),
            (".gitignore", self.artifacts.gitignore.as_str()),
            ("analytics.json", analytics.as_str()),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (name, content) in files {
            let path = dir.join(name);
            tokio::fs::write(&path, content)
                .await
                .map_err(|e| write_error(&path, e))?;
            written.push(path);
        }

        info!(output_dir = %dir.display(), files = written.len(), "Wrote artifacts");
        Ok(written)
    }
}

fn write_error(path: &Path, e: std::io::Error) -> RepogenError {
    RepogenError::Artifact {
        message: format!("Failed to write {}: {}", path.display(), e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("analysis_report")
            .with_operation("write_to")
            .with_metadata("path", &path.display().to_string()),
    }
}

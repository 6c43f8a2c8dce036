//! Core data type definitions

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse project stack, used to pick a `.gitignore` template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stack {
    Python,
    PythonJupyter,
    Node,
    NodeTypeScript,
}

impl Stack {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stack::Python => "python",
            Stack::PythonJupyter => "python-jupyter",
            Stack::Node => "node",
            Stack::NodeTypeScript => "node-typescript",
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File counts for a working copy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    pub total_files: usize,
    /// Language (or raw extension) with its file count, in first-seen order
    pub languages: Vec<(String, usize)>,
}

impl RepoStats {
    /// `Python (3), Markdown (1)` or `Unknown`
    pub fn languages_summary(&self) -> String {
        if self.languages.is_empty() {
            return "Unknown".to_string();
        }
        self.languages
            .iter()
            .map(|(lang, count)| format!("{} ({})", lang, count))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepogenConfig {
    pub repository: RepositoryConfig,
    pub readme: ReadmeConfig,
    pub tools: ToolsConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Directory that receives `<repo_name>` clones
    pub clone_base_dir: String,
    /// History depth for `git clone`; 0 clones the full history
    pub clone_depth: u32,
    pub clone_timeout_secs: u64,
    /// Extra attempts after the first failed clone
    pub clone_retries: usize,
    /// Directory names skipped when walking a working copy
    pub excluded_dirs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadmeConfig {
    pub tree_max_depth: usize,
    /// File names checked, in order, for the usage line
    pub entry_candidates: Vec<String>,
    pub contact_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub pipreqs_command: String,
    pub tool_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
    pub max_concurrent_analyses: usize,
    /// Accept local paths and `file://` URLs over HTTP
    pub allow_local_sources: bool,
}

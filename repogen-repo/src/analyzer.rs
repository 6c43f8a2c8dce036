//! Repository analyzer for extracting statistics and metadata

use crate::filter::{should_traverse_directory, RepoFile, RepoWalker};
use repogen_core::{ErrorContext, RepoStats, RepogenError, RepogenResult, Stack};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const LICENSE_FALLBACK: &str = "See LICENSE file.";
pub const NO_LICENSE: &str = "No license detected.";

/// Everything the README generator needs to know about a working copy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoAnalysis {
    pub project_name: String,
    pub folder_tree: String,
    pub main_script: Option<String>,
    pub stats: RepoStats,
    pub license: String,
    pub stack: Option<Stack>,
}

impl RepoAnalysis {
    pub fn has_license(&self) -> bool {
        self.license != NO_LICENSE
    }
}

/// Reads facts out of a working copy
#[derive(Debug, Clone)]
pub struct RepositoryAnalyzer {
    walker: RepoWalker,
}

impl RepositoryAnalyzer {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            walker: RepoWalker::new(root),
        }
    }

    pub fn with_walker(walker: RepoWalker) -> Self {
        Self { walker }
    }

    pub fn root(&self) -> &Path {
        self.walker.root()
    }

    /// Run every analysis used by the README
    pub fn analyze(
        &self,
        tree_max_depth: usize,
        entry_candidates: &[String],
    ) -> RepogenResult<RepoAnalysis> {
        let files = self.walker.files();

        Ok(RepoAnalysis {
            project_name: self.project_name(),
            folder_tree: self.folder_tree(tree_max_depth)?,
            main_script: detect_main_script_in(&files, entry_candidates),
            stats: stats_for(&files),
            license: self.detect_license(),
            stack: self.stack_for(&files),
        })
    }

    /// Guess the project stack from extension counts and folder names
    pub fn detect_stack(&self) -> Option<Stack> {
        self.stack_for(&self.walker.files())
    }

    fn stack_for(&self, files: &[RepoFile]) -> Option<Stack> {
        let counts = ordered_counts(files.iter().filter_map(|f| f.extension.clone()));
        let main_ext = most_common(&counts)?;
        let folders = self.walker.dir_names();

        let stack = if main_ext == ".py" || folders.contains("__pycache__") || folders.contains(".venv")
        {
            Some(Stack::Python)
        } else if main_ext == ".js" || folders.contains("node_modules") {
            Some(Stack::Node)
        } else if main_ext == ".ipynb" {
            Some(Stack::PythonJupyter)
        } else if main_ext == ".ts" {
            Some(Stack::NodeTypeScript)
        } else {
            None
        };

        debug!(main_ext = %main_ext, stack = ?stack, "Detected stack");
        stack
    }

    /// Total file count plus per-language counts
    pub fn count_files_and_languages(&self) -> RepoStats {
        stats_for(&self.walker.files())
    }

    /// First file matching a candidate name, shallowest match first
    pub fn detect_main_script(&self, candidates: &[String]) -> Option<String> {
        detect_main_script_in(&self.walker.files(), candidates)
    }

    /// First line of `LICENSE`, or a placeholder
    pub fn detect_license(&self) -> String {
        let license_path = self.root().join("LICENSE");
        match fs::read(&license_path) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                let first_line = text.lines().next().unwrap_or_default().trim();
                if first_line.is_empty() {
                    LICENSE_FALLBACK.to_string()
                } else {
                    first_line.to_string()
                }
            }
            Err(_) => NO_LICENSE.to_string(),
        }
    }

    /// Name from the `url =` line of `.git/config`, else the directory name
    pub fn project_name(&self) -> String {
        let git_config = self.root().join(".git").join("config");
        if let Ok(content) = fs::read_to_string(&git_config) {
            let remote = content
                .lines()
                .map(str::trim)
                .find(|line| line.starts_with("url ="))
                .and_then(|line| line.split_once('='))
                .map(|(_, url)| url.trim());

            if let Some(name) = remote.and_then(name_from_remote) {
                return name;
            }
        }

        self.root()
            .canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .or_else(|| self.root().file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "repository".to_string())
    }

    /// ASCII tree of the working copy, root children at depth 1
    pub fn folder_tree(&self, max_depth: usize) -> RepogenResult<String> {
        let root = self.root();
        let entries = sorted_entries(root, self.walker.excluded_dirs()).map_err(|e| {
            RepogenError::Repository {
                message: format!("Failed to list {}: {}", root.display(), e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("repository_analyzer").with_operation("folder_tree"),
            }
        })?;

        let mut lines = Vec::new();
        self.render_tree(entries, 1, max_depth, "", &mut lines);
        Ok(lines.join("\n"))
    }

    fn render_tree(
        &self,
        entries: Vec<(String, bool, std::path::PathBuf)>,
        depth: usize,
        max_depth: usize,
        prefix: &str,
        lines: &mut Vec<String>,
    ) {
        if depth > max_depth {
            return;
        }

        let count = entries.len();
        for (i, (name, is_dir, path)) in entries.into_iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { "└── " } else { "├── " };
            lines.push(format!("{}{}{}", prefix, connector, name));

            if is_dir && depth < max_depth {
                match sorted_entries(&path, self.walker.excluded_dirs()) {
                    Ok(children) => {
                        let child_prefix =
                            format!("{}{}", prefix, if is_last { "    " } else { "│   " });
                        self.render_tree(children, depth + 1, max_depth, &child_prefix, lines);
                    }
                    Err(e) => debug!(path = %path.display(), error = %e, "Skipping unreadable directory"),
                }
            }
        }
    }
}

fn sorted_entries(
    dir: &Path,
    excluded_dirs: &[String],
) -> std::io::Result<Vec<(String, bool, std::path::PathBuf)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_dir = path.is_dir();
        if is_dir && !should_traverse_directory(&path, excluded_dirs) {
            continue;
        }
        entries.push((entry.file_name().to_string_lossy().to_string(), is_dir, path));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

fn name_from_remote(url: &str) -> Option<String> {
    let last = url.trim_end_matches('/').rsplit(['/', ':']).next()?;
    let stem = Path::new(last).file_stem()?.to_string_lossy().to_string();
    (!stem.is_empty()).then_some(stem)
}

fn language_for(extension: &str) -> String {
    match extension {
        ".py" => "Python",
        ".js" => "JavaScript",
        ".ts" => "TypeScript",
        ".md" => "Markdown",
        ".json" => "JSON",
        other => other,
    }
    .to_string()
}

fn stats_for(files: &[RepoFile]) -> RepoStats {
    RepoStats {
        total_files: files.len(),
        languages: ordered_counts(
            files
                .iter()
                .filter_map(|f| f.extension.as_deref().map(language_for)),
        ),
    }
}

fn detect_main_script_in(files: &[RepoFile], candidates: &[String]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        files
            .iter()
            .filter(|f| &f.file_name == candidate)
            .min_by_key(|f| f.depth())
            .map(|f| f.relative_path.to_string_lossy().replace('\\', "/"))
    })
}

/// Counts in first-seen order
fn ordered_counts(items: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(key, _)| *key == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }
    counts
}

/// Highest count; the earliest key wins ties
fn most_common(counts: &[(String, usize)]) -> Option<&str> {
    let mut best: Option<&(String, usize)> = None;
    for entry in counts {
        if best.map_or(true, |b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    best.map(|(key, _)| key.as_str())
}

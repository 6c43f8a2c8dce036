//! File walking and filtering for working copies

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Check if a directory should be traversed
pub fn should_traverse_directory<P: AsRef<Path>>(dir_path: P, excluded_dirs: &[String]) -> bool {
    match dir_path.as_ref().file_name().and_then(|name| name.to_str()) {
        Some(name) => !excluded_dirs.iter().any(|excluded| excluded == name),
        None => true,
    }
}

/// A regular file inside a working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    /// Path relative to the walk root
    pub relative_path: PathBuf,
    pub file_name: String,
    /// Lowercased extension with its leading dot, e.g. `.py`
    pub extension: Option<String>,
}

impl RepoFile {
    /// Number of directories between the root and this file
    pub fn depth(&self) -> usize {
        self.relative_path.components().count().saturating_sub(1)
    }
}

/// Deterministic (name-sorted, depth-first) walk over a working copy
#[derive(Debug, Clone)]
pub struct RepoWalker {
    root: PathBuf,
    excluded_dirs: Vec<String>,
}

impl RepoWalker {
    /// Create a walker that skips `.git`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            excluded_dirs: vec![".git".to_string()],
        }
    }

    pub fn with_excluded_dirs(mut self, excluded_dirs: Vec<String>) -> Self {
        self.excluded_dirs = excluded_dirs;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn excluded_dirs(&self) -> &[String] {
        &self.excluded_dirs
    }

    fn entries(&self) -> impl Iterator<Item = DirEntry> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || should_traverse_directory(entry.path(), &self.excluded_dirs)
            })
            .filter_map(|result| match result {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
    }

    /// All regular files below the root
    pub fn files(&self) -> Vec<RepoFile> {
        self.entries()
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&self.root).ok()?.to_path_buf();
                let file_name = entry.file_name().to_string_lossy().to_string();
                let extension = entry
                    .path()
                    .extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()));
                Some(RepoFile {
                    relative_path,
                    file_name,
                    extension,
                })
            })
            .collect()
    }

    /// Lowercased names of every traversed directory (the root excluded)
    pub fn dir_names(&self) -> BTreeSet<String> {
        self.entries()
            .filter(|entry| entry.depth() > 0 && entry.file_type().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().to_lowercase())
            .collect()
    }
}

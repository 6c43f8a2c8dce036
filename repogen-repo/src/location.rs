//! Repository location parsing
//!
//! Turns user input (a clone URL or a local path) into a [`RepoLocation`] with a
//! directory-safe repository name.

use repogen_core::{validation_error, ErrorContext, RepogenError, RepogenResult};
use std::path::{Path, PathBuf};
use url::Url;

const REMOTE_SCHEMES: [&str; 5] = ["http", "https", "ssh", "git", "file"];

/// Where a repository lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoLocation {
    /// Cloned into `<clone_base_dir>/<name>` before analysis
    Remote { url: String, name: String },
    /// Analyzed in place
    Local { path: PathBuf, name: String },
}

impl RepoLocation {
    /// Parse a clone URL, an scp-style `git@host:owner/repo.git`, or a local path
    pub fn parse(input: &str) -> RepogenResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(validation_error!(
                "Repository URL must not be empty",
                "github_url",
                "repo_location"
            ));
        }

        if input.starts_with('-') {
            return Err(validation_error!(
                format!("Repository location must not start with '-': {}", input),
                "github_url",
                "repo_location"
            ));
        }

        if let Some((scheme, _)) = input.split_once("://") {
            let scheme = scheme.to_ascii_lowercase();
            if !REMOTE_SCHEMES.contains(&scheme.as_str()) {
                return Err(validation_error!(
                    format!("Unsupported URL scheme: {}", scheme),
                    "github_url",
                    "repo_location"
                ));
            }

            let parsed = Url::parse(input).map_err(|e| RepogenError::Validation {
                message: format!("Invalid repository URL: {}", e),
                field: Some("github_url".to_string()),
                context: ErrorContext::new("repo_location")
                    .with_operation("parse")
                    .with_suggestion("URL should look like https://github.com/owner/repo"),
            })?;

            let name = repo_name_from_path(parsed.path())?;
            return Ok(RepoLocation::Remote {
                url: input.to_string(),
                name,
            });
        }

        if let Some(path) = scp_path(input) {
            let name = repo_name_from_path(path)?;
            return Ok(RepoLocation::Remote {
                url: input.to_string(),
                name,
            });
        }

        let path = PathBuf::from(input);
        let name = local_name(&path);
        Ok(RepoLocation::Local { path, name })
    }

    pub fn name(&self) -> &str {
        match self {
            RepoLocation::Remote { name, .. } | RepoLocation::Local { name, .. } => name,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, RepoLocation::Remote { .. })
    }

    /// Remote and not a `file://` URL, so nothing on this machine is read
    pub fn is_network(&self) -> bool {
        match self {
            RepoLocation::Remote { url, .. } => !url
                .get(..7)
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file://")),
            RepoLocation::Local { .. } => false,
        }
    }
}

/// Path part of `user@host:path`, if the input has that shape
fn scp_path(input: &str) -> Option<&str> {
    let (user_host, path) = input.split_once(':')?;
    if user_host.contains('@') && !user_host.contains('/') && !path.is_empty() {
        Some(path)
    } else {
        None
    }
}

/// Last non-empty path segment with a trailing `.git` removed
pub fn repo_name_from_path(path: &str) -> RepogenResult<String> {
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
        return Err(validation_error!(
            format!("Cannot derive a repository name from '{}'", path),
            "github_url",
            "repo_location"
        ));
    }

    Ok(name.to_string())
}

fn local_name(path: &Path) -> String {
    path.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| path.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "repository".to_string())
}

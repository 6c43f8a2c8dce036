//! README rendering from a repository analysis

use repogen_core::{ErrorContext, ReadmeConfig, RepogenError, RepogenResult};
use repogen_repo::{RepoAnalysis, RepoWalker, RepositoryAnalyzer};
use std::path::Path;
use tracing::debug;

pub const DESCRIPTION_PLACEHOLDER: &str = "No description found. (Future: Use GPT to summarize)";
pub const NO_ENTRY_POINT: &str = "See source code for entry point.";

/// Renders `README.md` for a working copy
#[derive(Debug, Clone)]
pub struct ReadmeGenerator {
    config: ReadmeConfig,
    excluded_dirs: Vec<String>,
}

impl ReadmeGenerator {
    pub fn new(config: ReadmeConfig) -> Self {
        Self {
            config,
            excluded_dirs: vec![".git".to_string()],
        }
    }

    pub fn with_excluded_dirs(mut self, excluded_dirs: Vec<String>) -> Self {
        self.excluded_dirs = excluded_dirs;
        self
    }

    /// Analyze `root` and render the README
    pub fn generate(&self, root: &Path) -> RepogenResult<String> {
        if !root.is_dir() {
            return Err(RepogenError::Artifact {
                message: format!("Cannot generate README, not a directory: {}", root.display()),
                source: None,
                context: ErrorContext::new("readme_generator").with_operation("generate"),
            });
        }

        let walker = RepoWalker::new(root).with_excluded_dirs(self.excluded_dirs.clone());
        let analysis = RepositoryAnalyzer::with_walker(walker)
            .analyze(self.config.tree_max_depth, &self.config.entry_candidates)?;

        debug!(
            project_name = %analysis.project_name,
            total_files = analysis.stats.total_files,
            "Rendering README"
        );

        Ok(self.render(&analysis))
    }

    /// Render an existing analysis
    pub fn render(&self, analysis: &RepoAnalysis) -> String {
        let usage = match &analysis.main_script {
            Some(script) => format!("python {}", script),
            None => NO_ENTRY_POINT.to_string(),
        };

        let readme = format!(
            "# 📌 {name}

## 📄 Description
{description}

## ⚙️ Installation
```bash
pip install -r requirements.txt
```

## 🚀 Usage
{usage}

## 📁 Folder Structure
```
{tree}
```

## 📃 License
{license}

## 📊 Repo Stats
- Total files: {total}
- Languages: {languages}

## 🙌 Contributing / Contact
Pull requests welcome! For major changes, please open an issue first.

Contact: [maintainer](mailto:{email})
",
            name = analysis.project_name,
            description = DESCRIPTION_PLACEHOLDER,
            usage = usage,
            tree = analysis.folder_tree,
            license = analysis.license,
            total = analysis.stats.total_files,
            languages = analysis.stats.languages_summary(),
            email = self.config.contact_email,
        );

        readme.trim().to_string()
    }
}

//! `.gitignore` templates keyed by detected stack

use repogen_core::{ErrorContext, RepogenError, RepogenResult, Stack};
use repogen_repo::{RepoWalker, RepositoryAnalyzer};
use std::path::Path;
use tracing::debug;

pub const NO_TEMPLATE: &str =
    "# No suitable .gitignore template found. Please customize as needed.";

const PYTHON: &str = "# Python
__pycache__/
*.py[cod]
*.so
.venv/
.env
.env.*
*.egg-info/
dist/
build/
.ipynb_checkpoints/
";

const PYTHON_JUPYTER: &str = "# Python + Jupyter
__pycache__/
*.py[cod]
*.so
.venv/
.env
.env.*
*.egg-info/
dist/
build/
.ipynb_checkpoints/
*.ipynb
";

const NODE: &str = "# Node
node_modules/
dist/
build/
.env
.env.*
.npm/
.cache/
*.log
";

const NODE_TYPESCRIPT: &str = "# Node + TypeScript
node_modules/
dist/
build/
.env
.env.*
.npm/
.cache/
*.log
*.tsbuildinfo
";

/// Built-in template for a stack
pub fn template_for(stack: Stack) -> &'static str {
    match stack {
        Stack::Python => PYTHON,
        Stack::PythonJupyter => PYTHON_JUPYTER,
        Stack::Node => NODE,
        Stack::NodeTypeScript => NODE_TYPESCRIPT,
    }
}

/// Picks a `.gitignore` template from the working copy's stack
#[derive(Debug, Clone)]
pub struct GitignoreGenerator {
    excluded_dirs: Vec<String>,
}

impl Default for GitignoreGenerator {
    fn default() -> Self {
        Self {
            excluded_dirs: vec![".git".to_string()],
        }
    }
}

impl GitignoreGenerator {
    pub fn new(excluded_dirs: Vec<String>) -> Self {
        Self { excluded_dirs }
    }

    pub fn generate(&self, root: &Path) -> RepogenResult<String> {
        if !root.is_dir() {
            return Err(RepogenError::Artifact {
                message: format!("Not a directory: {}", root.display()),
                source: None,
                context: ErrorContext::new("gitignore_generator").with_operation("generate"),
            });
        }

        let walker = RepoWalker::new(root).with_excluded_dirs(self.excluded_dirs.clone());
        let stack = RepositoryAnalyzer::with_walker(walker).detect_stack();
        debug!(root = %root.display(), stack = ?stack, "Selecting .gitignore template");

        Ok(stack
            .map(template_for)
            .unwrap_or(NO_TEMPLATE)
            .to_string())
    }
}

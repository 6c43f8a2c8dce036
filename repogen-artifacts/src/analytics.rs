//! Heuristics over the generated markdown
//!
//! Everything here works on text only: the README's folder tree, the
//! extensions it mentions, and the error markers the generators emit.

use crate::docs::NO_MODULES;
use crate::gitignore::NO_TEMPLATE;
use crate::pipeline::{DOCS_FAILED_PREFIX, GITIGNORE_FAILED_PREFIX};
use crate::readme::NO_ENTRY_POINT;
use crate::requirements::ERROR_PREFIX as REQUIREMENTS_ERROR_PREFIX;
use crate::types::Artifacts;
use regex::Regex;
use repogen_repo::NO_LICENSE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use utoipa::ToSchema;

const TREE_GLYPHS: [&str; 2] = ["├── ", "└── "];
const INDENT_WIDTH: usize = 4;

/// Known extensions in reporting order
const LANGUAGE_TABLE: [(&str, &str); 12] = [
    (".py", "Python"),
    (".js", "JavaScript"),
    (".ts", "TypeScript"),
    (".tsx", "TypeScript (React)"),
    (".jsx", "JavaScript (React)"),
    (".rs", "Rust"),
    (".go", "Go"),
    (".java", "Java"),
    (".rb", "Ruby"),
    (".ipynb", "Jupyter Notebook"),
    (".html", "HTML"),
    (".css", "CSS"),
];

static EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(py|js|ts|tsx|jsx|rs|go|java|rb|ipynb|html|css)\b").unwrap()
});

/// File names without an extension that are still files
const BARE_FILE_NAMES: [&str; 10] = [
    "LICENSE",
    "Makefile",
    "Dockerfile",
    "Procfile",
    "README",
    "CHANGELOG",
    "NOTICE",
    "AUTHORS",
    "Gemfile",
    "Rakefile",
];

/// Counts read back from an ASCII folder tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TreeSummary {
    pub files: usize,
    pub folders: usize,
    /// Deepest entry, root children being 1
    pub max_depth: usize,
    /// File count per lowercased extension
    pub extensions: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthCheck {
    pub name: String,
    pub passed: bool,
    pub weight: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    /// Sum of the weights of passed checks, 0 to 100
    pub score: u8,
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    pub fn failed(&self) -> impl Iterator<Item = &HealthCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Analytics {
    pub tree: TreeSummary,
    pub languages: Vec<String>,
    pub health: HealthReport,
}

impl Analytics {
    pub fn from_artifacts(artifacts: &Artifacts) -> Self {
        Self {
            tree: parse_folder_tree(&artifacts.readme),
            languages: detect_languages(&artifacts.readme),
            health: health_score(artifacts),
        }
    }
}

/// Summarize the `├──`/`└──` lines of a markdown document
pub fn parse_folder_tree(markdown: &str) -> TreeSummary {
    let entries: Vec<(usize, &str)> = markdown
        .lines()
        .filter_map(|line| {
            let (pos, glyph) = TREE_GLYPHS
                .iter()
                .filter_map(|glyph| line.find(glyph).map(|pos| (pos, *glyph)))
                .min_by_key(|(pos, _)| *pos)?;
            let column = line[..pos].chars().count();
            let name = line[pos + glyph.len()..].trim();
            Some((column / INDENT_WIDTH + 1, name))
        })
        .filter(|(_, name)| !name.is_empty())
        .collect();

    let mut summary = TreeSummary::default();
    for (i, (depth, name)) in entries.iter().enumerate() {
        summary.max_depth = summary.max_depth.max(*depth);

        let has_children = entries.get(i + 1).is_some_and(|(next, _)| next > depth);
        if !has_children && is_file_name(name) {
            summary.files += 1;
            if let Some(ext) = extension_of(name) {
                *summary.extensions.entry(ext).or_insert(0) += 1;
            }
        } else {
            summary.folders += 1;
        }
    }
    summary
}

fn is_file_name(name: &str) -> bool {
    name.chars().skip(1).any(|c| c == '.') || BARE_FILE_NAMES.contains(&name)
}

fn extension_of(name: &str) -> Option<String> {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < name.len() => Some(name[pos..].to_lowercase()),
        _ => None,
    }
}

/// Languages whose extensions appear in the text, in table order
pub fn detect_languages(markdown: &str) -> Vec<String> {
    let found: Vec<&str> = EXTENSION_RE
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(0).map(|m| m.as_str()))
        .collect();

    LANGUAGE_TABLE
        .iter()
        .filter(|(ext, _)| found.contains(ext))
        .map(|(_, lang)| lang.to_string())
        .collect()
}

/// Weighted checklist over the generated artifacts
pub fn health_score(artifacts: &Artifacts) -> HealthReport {
    let tree = parse_folder_tree(&artifacts.readme);
    let documentation = artifacts.documentation.trim();
    let gitignore = artifacts.gitignore.trim();

    let checks = vec![
        check("license", 20, !artifacts.readme.contains(NO_LICENSE)),
        check(
            "requirements",
            20,
            !artifacts.requirements.starts_with(REQUIREMENTS_ERROR_PREFIX),
        ),
        check(
            "documentation",
            20,
            !documentation.is_empty()
                && documentation != NO_MODULES
                && !documentation.starts_with(DOCS_FAILED_PREFIX)
                && !documentation.starts_with("# Error"),
        ),
        check(
            "gitignore",
            20,
            !gitignore.is_empty()
                && gitignore != NO_TEMPLATE
                && !gitignore.starts_with(GITIGNORE_FAILED_PREFIX),
        ),
        check("entry_point", 10, !artifacts.readme.contains(NO_ENTRY_POINT)),
        check("folder_structure", 10, tree.folders > 0),
    ];

    let score = checks.iter().filter(|c| c.passed).map(|c| c.weight).sum();
    HealthReport { score, checks }
}

fn check(name: &str, weight: u8, passed: bool) -> HealthCheck {
    HealthCheck {
        name: name.to_string(),
        passed,
        weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const README: &str = "# 📌 demo

## 🚀 Usage
python app/main.py

## 📁 Folder Structure
```
├── LICENSE
├── README.md
├── app
│   ├── __init__.py
│   ├── core
│   │   └── engine.py
│   └── main.py
├── docs
├── package.json
└── web
    └── index.tsx
```

## 📃 License
MIT License";

    fn artifacts(readme: &str) -> Artifacts {
        Artifacts {
            requirements: "flask==3.0.0".to_string(),
            readme: readme.to_string(),
            documentation: "## Module `app.main`\n\n_No public API found._".to_string(),
            gitignore: "# Python\n__pycache__/\n".to_string(),
        }
    }

    #[test]
    fn tree_counts_files_folders_and_depth() {
        let tree = parse_folder_tree(README);
        assert_eq!(tree.files, 7);
        assert_eq!(tree.folders, 4);
        assert_eq!(tree.max_depth, 3);
        assert_eq!(tree.extensions.get(".py"), Some(&3));
        assert_eq!(tree.extensions.get(".tsx"), Some(&1));
        assert_eq!(tree.extensions.get(".json"), Some(&1));
        assert!(!tree.extensions.contains_key("license"));
    }

    #[test]
    fn bare_names_split_into_known_files_and_folders() {
        let tree = parse_folder_tree("├── LICENSE\n└── Makefile");
        assert_eq!((tree.files, tree.folders), (2, 0));
        assert!(tree.extensions.is_empty());

        let tree = parse_folder_tree("├── build\n├── docs\n└── setup.py");
        assert_eq!((tree.files, tree.folders), (1, 2));
    }

    #[test]
    fn empty_text_has_empty_tree() {
        assert_eq!(parse_folder_tree("no tree here"), TreeSummary::default());
    }

    #[test]
    fn languages_follow_table_order() {
        assert_eq!(
            detect_languages(README),
            vec!["Python".to_string(), "TypeScript (React)".to_string()]
        );
        assert!(detect_languages("settings.json and data.pyc").is_empty());
    }

    #[test]
    fn healthy_repository_scores_full_marks() {
        let report = health_score(&artifacts(README));
        assert_eq!(report.score, 100);
        assert_eq!(report.failed().count(), 0);
    }

    #[test]
    fn failures_lose_their_weight() {
        let readme = README
            .replace("MIT License", NO_LICENSE)
            .replace("python app/main.py", NO_ENTRY_POINT);
        let mut artifacts = artifacts(&readme);
        artifacts.requirements = format!("{}pipreqs error: boom", REQUIREMENTS_ERROR_PREFIX);
        artifacts.documentation = NO_MODULES.to_string();
        artifacts.gitignore = NO_TEMPLATE.to_string();

        let report = health_score(&artifacts);
        assert_eq!(report.score, 10);
        let failed: Vec<&str> = report.failed().map(|c| c.name.as_str()).collect();
        assert_eq!(
            failed,
            vec!["license", "requirements", "documentation", "gitignore", "entry_point"]
        );
    }
}

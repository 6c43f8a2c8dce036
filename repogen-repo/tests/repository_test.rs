//! Working-copy analysis and cloning against real directories

use repogen_core::{RepogenError, Stack};
use repogen_repo::{CloneOptions, RepoLocation, RepositoryAnalyzer, RepositoryProcessor};
use std::fs;
use std::path::Path;
use std::process::Command;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn python_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "LICENSE", "MIT License\n\nCopyright (c) 2024\n");
    write(root, "README.md", "# demo\n");
    write(root, "setup.json", "{}");
    write(root, "app/__init__.py", "");
    write(root, "app/main.py", "import os\n");
    write(root, "app/core/engine.py", "");
    write(root, "app/core/deep/more.py", "");
    write(root, "tests/test_main.py", "");
    write(root, ".git/config", "[remote \"origin\"]\n\turl = https://github.com/acme/widget.git\n");
    dir
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[test]
fn folder_tree_matches_expected_layout() {
    let dir = python_project();
    let analyzer = RepositoryAnalyzer::new(dir.path());

    let tree = analyzer.folder_tree(2).unwrap();
    let expected = [
        "├── LICENSE",
        "├── README.md",
        "├── app",
        "│   ├── __init__.py",
        "│   ├── core",
        "│   └── main.py",
        "├── setup.json",
        "└── tests",
        "    └── test_main.py",
    ]
    .join("\n");
    assert_eq!(tree, expected);

    let shallow = analyzer.folder_tree(1).unwrap();
    assert_eq!(shallow.lines().count(), 5);
}

#[test]
fn analysis_of_python_project() {
    let dir = python_project();
    let analyzer = RepositoryAnalyzer::new(dir.path());
    let candidates = vec!["main.py".to_string(), "app.py".to_string()];

    let analysis = analyzer.analyze(2, &candidates).unwrap();
    assert_eq!(analysis.project_name, "widget");
    assert_eq!(analysis.license, "MIT License");
    assert!(analysis.has_license());
    assert_eq!(analysis.main_script.as_deref(), Some("app/main.py"));
    assert_eq!(analysis.stack, Some(Stack::Python));
    assert_eq!(analysis.stats.total_files, 8);
    assert_eq!(
        analysis.stats.languages_summary(),
        "Markdown (1), Python (5), JSON (1)"
    );
}

#[test]
fn stack_detection_variants() {
    let node = tempfile::tempdir().unwrap();
    write(node.path(), "index.js", "");
    write(node.path(), "lib/a.js", "");
    write(node.path(), "README.md", "");
    assert_eq!(RepositoryAnalyzer::new(node.path()).detect_stack(), Some(Stack::Node));

    let ts = tempfile::tempdir().unwrap();
    write(ts.path(), "src/a.ts", "");
    write(ts.path(), "src/b.ts", "");
    write(ts.path(), "package.json", "{}");
    assert_eq!(
        RepositoryAnalyzer::new(ts.path()).detect_stack(),
        Some(Stack::NodeTypeScript)
    );

    let notebooks = tempfile::tempdir().unwrap();
    write(notebooks.path(), "a.ipynb", "{}");
    assert_eq!(
        RepositoryAnalyzer::new(notebooks.path()).detect_stack(),
        Some(Stack::PythonJupyter)
    );

    // A virtualenv folder wins over the dominant extension
    let venv = tempfile::tempdir().unwrap();
    write(venv.path(), "web/a.html", "");
    write(venv.path(), ".venv/pyvenv.cfg", "");
    assert_eq!(RepositoryAnalyzer::new(venv.path()).detect_stack(), Some(Stack::Python));

    let rust = tempfile::tempdir().unwrap();
    write(rust.path(), "src/main.rs", "");
    assert_eq!(RepositoryAnalyzer::new(rust.path()).detect_stack(), None);

    let empty = tempfile::tempdir().unwrap();
    write(empty.path(), "Makefile", "");
    assert_eq!(RepositoryAnalyzer::new(empty.path()).detect_stack(), None);
}

#[test]
fn license_and_name_fallbacks() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("plain-project");
    write(&project, "notes.txt", "");

    let analyzer = RepositoryAnalyzer::new(&project);
    assert_eq!(analyzer.detect_license(), "No license detected.");
    assert_eq!(analyzer.project_name(), "plain-project");
    assert_eq!(analyzer.detect_main_script(&["main.py".to_string()]), None);

    write(&project, "LICENSE", "\nApache License\n");
    assert_eq!(analyzer.detect_license(), "See LICENSE file.");
}

#[tokio::test]
async fn clone_from_file_url_replaces_previous_clone() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let workspace = tempfile::tempdir().unwrap();
    let origin = workspace.path().join("origin-repo");
    write(&origin, "main.py", "print('hello')\n");

    let git = |args: &[&str]| {
        let status = Command::new("git")
            .args(args)
            .current_dir(&origin)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    };
    git(&["init", "-q"]);
    git(&["add", "."]);
    git(&[
        "-c",
        "user.name=Test",
        "-c",
        "user.email=test@example.com",
        "commit",
        "-q",
        "-m",
        "init",
    ]);

    let url = format!("file://{}", origin.display());
    let location = RepoLocation::parse(&url).unwrap();
    assert_eq!(location.name(), "origin-repo");

    let clones = workspace.path().join("clones");
    let processor = RepositoryProcessor::new(&clones).with_options(CloneOptions {
        retries: 0,
        access_token: None,
        ..CloneOptions::default()
    });

    let first = processor.acquire(&location).await.unwrap();
    assert_eq!(first, clones.join("origin-repo"));
    assert!(first.join("main.py").exists());

    // Leftovers from an earlier clone must not survive a re-clone
    fs::write(first.join("stale.txt"), "old").unwrap();
    let second = processor.acquire(&location).await.unwrap();
    assert!(!second.join("stale.txt").exists());
    assert!(second.join("main.py").exists());

    let analyzer = RepositoryAnalyzer::new(&second);
    assert_eq!(analyzer.project_name(), "origin-repo");
}

#[tokio::test]
async fn clone_failure_reports_git_error() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let workspace = tempfile::tempdir().unwrap();
    let processor = RepositoryProcessor::new(workspace.path()).with_options(CloneOptions {
        retries: 0,
        access_token: None,
        ..CloneOptions::default()
    });

    let url = format!("file://{}/does-not-exist", workspace.path().display());
    match processor.clone_repository(&url, "does-not-exist").await {
        Err(RepogenError::Clone { message, .. }) => {
            assert!(message.starts_with("Failed to clone repo:"));
        }
        other => panic!("expected clone error, got {:?}", other),
    }
}

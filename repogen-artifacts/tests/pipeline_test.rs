//! End-to-end pipeline runs over scratch repositories

use async_trait::async_trait;
use repogen_artifacts::{AnalysisPipeline, CommandOutput, CommandRunner, DOCS_FAILED_PREFIX};
use repogen_core::{RepogenConfig, RepogenError, RepogenResult};
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn config(clone_dir: &Path) -> RepogenConfig {
    let mut config = RepogenConfig::default();
    config.repository.clone_base_dir = clone_dir.display().to_string();
    config.repository.clone_retries = 0;
    config.tools.pipreqs_command = "repogen-test-no-such-pipreqs".to_string();
    config.readme.contact_email = "team@example.com".to_string();
    config
}

fn flask_project(root: &Path) {
    write(root, "LICENSE", "MIT License\n");
    write(
        root,
        "app.py",
        "\"\"\"Tiny flask app.\"\"\"\n\nfrom flask import Flask\n\n\ndef create_app():\n    \"\"\"Build the app.\"\"\"\n    return Flask(__name__)\n",
    );
    write(root, "service/__init__.py", "");
    write(
        root,
        "service/jobs.py",
        "class Job:\n    \"\"\"A unit of work.\"\"\"\n\n    def run(self):\n        \"\"\"Run it.\"\"\"\n",
    );
}

#[tokio::test]
async fn local_python_project_report() {
    let workspace = tempfile::tempdir().unwrap();
    let project = workspace.path().join("flask-demo");
    flask_project(&project);

    let pipeline = AnalysisPipeline::new(&config(&workspace.path().join("clones")));
    let report = pipeline
        .analyze(&project.display().to_string(), true)
        .await
        .unwrap();

    assert_eq!(report.message, "Analysis completed");
    assert!(report.repo_path.ends_with("flask-demo"));

    let artifacts = &report.artifacts;
    assert_eq!(
        artifacts.requirements,
        "# Error generating requirements.txt: pipreqs is not installed. Please install it with 'pip install pipreqs'."
    );

    assert!(artifacts.readme.starts_with("# 📌 flask-demo"));
    assert!(artifacts.readme.contains("## 🚀 Usage\npython app.py\n"));
    assert!(artifacts.readme.contains("## 📃 License\nMIT License\n"));
    assert!(artifacts.readme.contains("- Total files: 4\n- Languages: Python (3)\n"));
    assert!(artifacts.readme.ends_with("Contact: [maintainer](mailto:team@example.com)"));

    assert!(artifacts
        .documentation
        .starts_with("## Module `app`\n\nTiny flask app.\n\n### `def create_app()`\n\nBuild the app."));
    assert!(artifacts
        .documentation
        .contains("## Module `service.jobs`\n\n### `class Job`\n\nA unit of work.\n\n#### `def run(self)`\n\nRun it."));
    assert!(!artifacts.documentation.starts_with(DOCS_FAILED_PREFIX));

    assert!(artifacts.gitignore.starts_with("# Python\n"));

    let analytics = &report.analytics;
    assert_eq!(analytics.tree.folders, 1);
    assert_eq!(analytics.tree.files, 4);
    assert_eq!(analytics.languages, vec!["Python".to_string()]);
    // Everything but requirements passes
    assert_eq!(analytics.health.score, 80);
}

#[tokio::test]
async fn empty_project_still_reports() {
    let workspace = tempfile::tempdir().unwrap();
    let project = workspace.path().join("empty");
    fs::create_dir_all(&project).unwrap();

    let pipeline = AnalysisPipeline::new(&config(&workspace.path().join("clones")));
    let report = pipeline
        .analyze(&project.display().to_string(), true)
        .await
        .unwrap();

    let artifacts = &report.artifacts;
    assert!(artifacts.readme.contains("See source code for entry point."));
    assert!(artifacts.readme.contains("No license detected."));
    assert!(artifacts.readme.contains("- Languages: Unknown"));
    assert_eq!(artifacts.documentation, "# No Python modules found for documentation.");
    assert_eq!(
        artifacts.gitignore,
        "# No suitable .gitignore template found. Please customize as needed."
    );
    assert_eq!(report.analytics.health.score, 0);
}

/// Writes a fixed requirements file wherever `--savepath` points
struct PinningRunner;

#[async_trait]
impl CommandRunner for PinningRunner {
    async fn run(
        &self,
        _program: &str,
        args: &[String],
        _timeout_secs: u64,
    ) -> RepogenResult<CommandOutput> {
        fs::write(&args[3], "flask==3.0.3\n")?;
        Ok(CommandOutput {
            success: true,
            ..CommandOutput::default()
        })
    }
}

#[tokio::test]
async fn local_checkout_requirements_are_left_alone() {
    let workspace = tempfile::tempdir().unwrap();
    let project = workspace.path().join("flask-demo");
    flask_project(&project);
    write(&project, "requirements.txt", "flask>=2  # hand maintained\n");

    let pipeline = AnalysisPipeline::new(&config(&workspace.path().join("clones")))
        .with_command_runner(Arc::new(PinningRunner));
    let report = pipeline
        .analyze(&project.display().to_string(), true)
        .await
        .unwrap();

    assert_eq!(report.artifacts.requirements, "flask==3.0.3");
    assert_eq!(
        fs::read_to_string(project.join("requirements.txt")).unwrap(),
        "flask>=2  # hand maintained\n"
    );
}

#[tokio::test]
async fn missing_local_path_is_not_found() {
    let workspace = tempfile::tempdir().unwrap();
    let pipeline = AnalysisPipeline::new(&config(workspace.path()));

    let missing = workspace.path().join("nope");
    let result = pipeline.analyze(&missing.display().to_string(), true).await;
    assert!(matches!(result, Err(RepogenError::NotFound { .. })));
}

#[tokio::test]
async fn remote_repository_is_cloned_then_analyzed() {
    let git_available = Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !git_available {
        eprintln!("git not available, skipping");
        return;
    }

    let workspace = tempfile::tempdir().unwrap();
    let origin = workspace.path().join("remote-tool");
    flask_project(&origin);
    for args in [
        vec!["init", "-q"],
        vec!["add", "."],
        vec![
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "commit",
            "-q",
            "-m",
            "init",
        ],
    ] {
        let status = Command::new("git")
            .args(&args)
            .current_dir(&origin)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    let clones = workspace.path().join("clones");
    let pipeline = AnalysisPipeline::new(&config(&clones));
    let url = format!("file://{}", origin.display());

    let report = pipeline.analyze(&url, true).await.unwrap();
    assert_eq!(Path::new(&report.repo_path), clones.join("remote-tool"));
    assert!(report.artifacts.readme.starts_with("# 📌 remote-tool"));

    let out = workspace.path().join("out");
    report.write_to(&out).await.unwrap();
    for name in [
        "README.md",
        "requirements.txt",
        "DOCUMENTATION.md",
        ".gitignore",
        "analytics.json",
    ] {
        assert!(out.join(name).exists(), "{} missing", name);
    }
}

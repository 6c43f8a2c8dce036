//! API endpoint tests
//!
//! Router-level checks go through `tower::ServiceExt::oneshot`; the full
//! analysis runs against a real server bound to an ephemeral port.

use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE, ORIGIN,
        },
        Request, StatusCode,
    },
};
use repogen_core::RepogenConfig;
use repogen_web::{create_app, AppState};
use serde_json::{json, Value};
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

fn test_config(clone_dir: &Path) -> RepogenConfig {
    let mut config = RepogenConfig::default();
    config.repository.clone_base_dir = clone_dir.display().to_string();
    config.repository.clone_retries = 0;
    config.tools.pipreqs_command = "repogen-test-no-such-pipreqs".to_string();
    config
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(AppState::new(test_config(dir.path())));

    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn config_hides_nothing_secret() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(AppState::new(test_config(dir.path())));

    let request = Request::builder()
        .uri("/api/config")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["port"], 8000);
    assert_eq!(body["max_concurrent_analyses"], 4);
    assert!(body.get("clone_base_dir").is_none());
}

#[tokio::test]
async fn local_paths_are_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(AppState::new(test_config(dir.path())));

    let body = json!({ "github_url": dir.path().display().to_string() }).to_string();
    let (status, body) = send(app.clone(), post_json("/analyze", &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Not a remote repository URL"));

    let (status, body) = send(app, post_json("/api/analyze", r#"{"github_url": "   "}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn file_urls_are_unprocessable_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(AppState::new(test_config(dir.path())));

    let body = json!({ "github_url": "file:///etc/secret-repo" }).to_string();
    let (status, body) = send(app, post_json("/analyze", &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Not a remote repository URL"));
    assert!(!dir.path().join("secret-repo").exists());
}

#[tokio::test]
async fn clone_failure_is_a_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir.path().join("clones"));
    config.server.allow_local_sources = true;
    let app = create_app(AppState::new(config));

    let url = format!("file://{}/missing-repo", dir.path().display());
    let body = json!({ "github_url": url }).to_string();
    let (status, body) = send(app, post_json("/api/analyze", &body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["detail"].as_str().unwrap().is_empty());
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/api/analyze")
        .header(ORIGIN, origin)
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn cors_allows_only_listed_origins() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.server.allowed_origins = vec!["https://app.example.com".to_string()];
    let app = create_app(AppState::new(config));

    let response = app
        .clone()
        .oneshot(preflight("https://app.example.com"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );

    let response = app.oneshot(preflight("https://evil.example.net")).await.unwrap();
    assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn cors_defaults_to_any_origin() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(AppState::new(test_config(dir.path())));

    let response = app.oneshot(preflight("https://anywhere.dev")).await.unwrap();
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn analyses_wait_for_a_free_permit() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.server.max_concurrent_analyses = 1;
    let state = AppState::new(config);
    let app = create_app(state.clone());

    let held = state.analysis_permits.clone().acquire_owned().await.unwrap();
    let body = json!({ "github_url": "https://github.com/owner/repo" }).to_string();
    let request = app.oneshot(post_json("/analyze", &body));
    tokio::pin!(request);

    let waited = tokio::time::timeout(Duration::from_millis(100), &mut request).await;
    assert!(waited.is_err(), "request ran without a permit");
    assert_eq!(state.analysis_permits.available_permits(), 0);

    // Closing the semaphore turns the queued request into a 503
    state.analysis_permits.close();
    drop(held);
    let response = request.await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(AppState::new(test_config(dir.path())));

    let (status, _) = send(app.clone(), post_json("/analyze", "{not json")).await;
    assert!(status.is_client_error());

    let (status, _) = send(app, post_json("/analyze", r#"{"url": "x"}"#)).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(AppState::new(test_config(dir.path())));

    let request = Request::builder()
        .uri("/api/openapi.json")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/analyze"].is_object());
}

#[tokio::test]
async fn analyze_over_http() {
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
    let origin = workspace.path().join("hello-service");
    std::fs::create_dir_all(&origin).unwrap();
    std::fs::write(
        origin.join("main.py"),
        "\"\"\"Entry point.\"\"\"\n\n\ndef main():\n    \"\"\"Say hello.\"\"\"\n    print('hello')\n",
    )
    .unwrap();
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

    let mut config = test_config(&workspace.path().join("clones"));
    config.server.allow_local_sources = true;
    let state = AppState::new(config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, create_app(state)).await.unwrap();
    });

    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/analyze", address))
        .json(&json!({ "github_url": format!("file://{}", origin.display()) }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let report: Value = response.json().await.unwrap();
    assert_eq!(report["message"], "Analysis completed");
    assert!(report["repo_path"]
        .as_str()
        .unwrap()
        .ends_with("hello-service"));
    assert!(report["readme"]
        .as_str()
        .unwrap()
        .starts_with("# 📌 hello-service"));
    assert!(report["readme"]
        .as_str()
        .unwrap()
        .contains("## 🚀 Usage\npython main.py"));
    assert!(report["requirements"]
        .as_str()
        .unwrap()
        .starts_with("# Error generating requirements.txt: "));
    assert!(report["documentation"]
        .as_str()
        .unwrap()
        .starts_with("## Module `main`\n\nEntry point."));
    assert!(report["gitignore"].as_str().unwrap().starts_with("# Python"));
    assert_eq!(report["analytics"]["languages"], json!(["Python"]));

    let response = client
        .post(format!("{}/api/analyze", address))
        .json(&json!({
            "github_url": format!("file://{}/missing-repo", workspace.path().display())
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let error: Value = response.json().await.unwrap();
    assert!(error["detail"]
        .as_str()
        .unwrap()
        .contains("Failed to clone repo"));
}

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use ocrhub::domain::config::{ApiConfig, SslConfig};
use ocrhub_server::Server;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Config rooted in a temp dir, pointing at engine binaries that do not exist.
fn offline_config(root: &TempDir) -> ApiConfig {
    let mut cfg = ApiConfig::default();
    cfg.storage.input_dir = root.path().join("data/input");
    cfg.storage.output_dir = root.path().join("data/output");
    cfg.ocr.engine_binary = root.path().join("bin/no-such-tesseract");
    cfg.ocr.rasterizer_binary = root.path().join("bin/no-such-pdftoppm");
    cfg.ocr.health_timeout_seconds = 2;
    cfg
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    (status, to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn build_creates_data_directories() {
    let root = TempDir::new().unwrap();
    let cfg = offline_config(&root);

    let server = Server::builder().config(cfg.clone()).build().await.unwrap();

    assert!(cfg.storage.input_dir.is_dir());
    assert!(cfg.storage.output_dir.is_dir());
    assert!(server.state().slice_names().any(|name| name == "recognition"));
    assert_eq!(server.state().health_checks().count(), 1);
}

#[tokio::test]
async fn build_fails_without_ssl_certificate() {
    let root = TempDir::new().unwrap();
    let mut cfg = offline_config(&root);
    cfg.server.ssl =
        Some(SslConfig { cert: root.path().join("missing.pem"), key: root.path().join("missing.key") });

    let err = Server::builder().config(cfg).build().await.unwrap_err();
    assert!(err.to_string().contains("SSL certificate not found"));
}

#[tokio::test]
async fn missing_engine_reports_unhealthy() {
    let root = TempDir::new().unwrap();
    let server = Server::builder().config(offline_config(&root)).build().await.unwrap();

    let (status, json) = get_json(server.router(), "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["failed"], serde_json::json!(["ocr_engine"]));
    assert_eq!(json["languages"], serde_json::json!(["en", "es"]));
}

#[tokio::test]
async fn status_is_served_without_an_engine() {
    let root = TempDir::new().unwrap();
    let server = Server::builder().config(offline_config(&root)).build().await.unwrap();

    let (status, json) = get_json(server.router(), "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["service"], "OcrHub Server");
    assert!(json["engine"].is_null());
}

#[tokio::test]
async fn api_reference_documents_every_route() {
    let root = TempDir::new().unwrap();
    let server = Server::builder().config(offline_config(&root)).build().await.unwrap();

    let (status, body) = get(server.router(), "/api").await;
    let page = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    for path in ["/health", "/process", "/status"] {
        assert!(page.contains(path), "{path} missing from the API reference");
    }
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let root = TempDir::new().unwrap();
    let server = Server::builder().config(offline_config(&root)).build().await.unwrap();

    let (status, _) = get(server.router(), "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

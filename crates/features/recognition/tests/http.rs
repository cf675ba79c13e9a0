mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, StatusCode, header};
use common::{BrokenEngine, Sandbox, echo, rasterizer};
use ocrhub_kernel::server::ApiState;
use ocrhub_recognition::router::recognition_router;
use ocrhub_recognition::{OcrEngine, init_with};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "ocrhub-test-boundary";

enum Part<'a> {
    File { field: &'a str, name: &'a str, content: &'a [u8] },
    Text { field: &'a str, value: &'a str },
}

fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { field, name, content } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            },
            Part::Text { field, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}").as_bytes(),
                );
            },
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn app(sandbox: &Sandbox, engine: Arc<dyn OcrEngine>) -> Router {
    let feature = init_with(&sandbox.config, engine, rasterizer(1)).await.unwrap();
    let state = ApiState::builder()
        .config(sandbox.config.clone())
        .register_slice(feature.slice)
        .health_check(feature.health)
        .build()
        .unwrap();

    let (router, _api) = recognition_router().split_for_parts();
    router.layer(DefaultBodyLimit::max(sandbox.config.ocr.max_upload_bytes)).with_state(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn post_process(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn process_returns_recognized_text() {
    let sandbox = Sandbox::new();
    let app = app(&sandbox, echo()).await;

    let body = multipart(&[
        Part::Text { field: "language", value: "en" },
        Part::File { field: "file", name: "receipt 01.jpg", content: b"Coffee 2.50\nTotal 2.50" },
    ]);
    let (status, json) = send(app, post_process(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["text"], "Coffee 2.50\nTotal 2.50");
    assert_eq!(json["language"], "en");
    assert_eq!(json["filename"], "receipt_01.jpg");
    assert_eq!(json["raw_result"][0][0]["bbox"], serde_json::json!([[0, 0], [10, 0], [10, 5], [0, 5]]));
    assert!(json.get("output_file").is_none());
    assert_eq!(sandbox.input_entries(), 0);
}

#[tokio::test]
async fn process_without_file_is_rejected() {
    let sandbox = Sandbox::new();

    let body = multipart(&[Part::Text { field: "language", value: "es" }]);
    let (status, json) = send(app(&sandbox, echo()).await, post_process(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, serde_json::json!({ "error": "No file provided" }));

    // A `file` field that is not an upload does not count either.
    let body = multipart(&[Part::Text { field: "file", value: "scan.png" }]);
    let (status, json) = send(app(&sandbox, echo()).await, post_process(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No file provided");

    let request = Request::builder().method("POST").uri("/process").body(Body::empty()).unwrap();
    let (status, json) = send(app(&sandbox, echo()).await, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No file provided");
}

#[tokio::test]
async fn process_with_unsupported_file_is_rejected() {
    let sandbox = Sandbox::new();

    for name in ["malware.exe", "notes.txt"] {
        let body = multipart(&[Part::File { field: "file", name, content: b"x" }]);
        let (status, json) = send(app(&sandbox, echo()).await, post_process(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{name:?}");
        assert_eq!(json, serde_json::json!({ "error": "Invalid file" }));
    }
}

#[tokio::test]
async fn engine_failures_map_to_status_codes() {
    let cases = [
        (BrokenEngine::Missing, StatusCode::SERVICE_UNAVAILABLE),
        (BrokenEngine::Crashing, StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (engine, expected) in cases {
        let sandbox = Sandbox::new();
        let body = multipart(&[Part::File { field: "file", name: "a.png", content: b"x" }]);
        let (status, json) = send(app(&sandbox, Arc::new(engine)).await, post_process(body)).await;

        assert_eq!(status, expected, "{engine:?}");
        assert!(json["error"].as_str().is_some_and(|msg| !msg.is_empty()));
        assert_eq!(sandbox.input_entries(), 0);
    }
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let mut sandbox = Sandbox::new();
    sandbox.config.ocr.max_upload_bytes = 1024;

    let content = vec![b'x'; 4096];
    let body = multipart(&[Part::File { field: "file", name: "big.png", content: &content }]);
    let (status, _) = send(app(&sandbox, echo()).await, post_process(body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(sandbox.input_entries(), 0);
}

#[tokio::test]
async fn index_lists_endpoints_and_languages() {
    let sandbox = Sandbox::new();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, json) = send(app(&sandbox, echo()).await, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["service"], "OcrHub Server");
    assert_eq!(json["endpoints"], serde_json::json!(["/health", "/process", "/status"]));
    assert_eq!(json["languages"], serde_json::json!(["en", "es"]));
}

#[tokio::test]
async fn status_reports_formats_and_engine() {
    let sandbox = Sandbox::new();
    let request = Request::builder().uri("/status").body(Body::empty()).unwrap();
    let (status, json) = send(app(&sandbox, echo()).await, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["version"], "1.0");
    assert_eq!(json["languages"], serde_json::json!(["en", "es"]));
    assert_eq!(json["formats"], serde_json::json!(["png", "jpg", "jpeg", "pdf", "bmp", "tiff"]));
    assert_eq!(json["engine"], "echo 1.0");

    let request = Request::builder().uri("/status").body(Body::empty()).unwrap();
    let (_, json) = send(app(&sandbox, Arc::new(BrokenEngine::Missing)).await, request).await;
    assert!(json["engine"].is_null());
}

#[cfg(unix)]
#[tokio::test]
async fn slow_engine_binary_times_out_with_504() {
    use ocrhub_recognition::TesseractEngine;
    use std::os::unix::fs::PermissionsExt;
    use std::time::{Duration, Instant};

    let mut sandbox = Sandbox::new();
    let script = sandbox.root.path().join("slow-tesseract");
    std::fs::write(&script, "#!/bin/sh\n[ \"$1\" = \"--version\" ] && { echo 'tesseract 5.3.0'; exit 0; }\nexec sleep 30\n")
        .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    sandbox.config.ocr.engine_binary = script;
    sandbox.config.ocr.timeout_seconds = 1;

    let engine = Arc::new(TesseractEngine::new(&sandbox.config.ocr));
    let body = multipart(&[Part::File { field: "file", name: "scan.png", content: b"x" }]);

    let started = Instant::now();
    let (status, json) = send(app(&sandbox, engine).await, post_process(body)).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(json["error"].as_str().unwrap().starts_with("Timed out after 1s"), "{json}");
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(sandbox.input_entries(), 0);
}

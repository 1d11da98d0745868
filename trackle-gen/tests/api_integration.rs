//! Integration tests for the trigger API
//!
//! Tests the complete HTTP surface including:
//! - Health checks
//! - Bearer-token authorization
//! - Reset pipeline end-to-end
//! - Verification sweep end-to-end

use axum::http::StatusCode;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use trackle_common::config::ModeConfig;
use trackle_gen::api::{create_router, AppState};
use trackle_gen::db;
use trackle_gen::duration::DurationResolver;
use trackle_gen::pipeline::ResetPipeline;
use trackle_gen::storage::FsBlobStore;

const SECRET: &str = "integration-test-secret";

/// One MPEG1 Layer III frame: 128 kbps, 44100 Hz, no padding, 417 bytes
fn build_frame(fill: u8) -> Vec<u8> {
    let mut frame = vec![fill; 417];
    frame[0] = 0xFF;
    frame[1] = 0xFB;
    frame[2] = 0x90;
    frame[3] = 0x00;
    frame
}

fn build_stream(count: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(count * 417);
    for i in 0..count {
        buf.extend_from_slice(&build_frame((i % 251) as u8));
    }
    buf
}

/// Test helper to create a test server over temp stores and an
/// in-memory database, with one mode and one synthetic track
async fn setup_test_server() -> (tempfile::TempDir, axum::Router, Arc<ResetPipeline>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let source_root = dir.path().join("sources");
    let snippet_root = dir.path().join("snippets");

    let catalog_path = dir.path().join("classic.toml");
    let mut file = std::fs::File::create(&catalog_path).expect("Failed to create catalog");
    writeln!(file, "[[songs]]\nname = \"Only Song\"\nalbum = \"Only Album\"").unwrap();

    let track_path = source_root.join("songs/Only Song.mp3");
    std::fs::create_dir_all(track_path.parent().unwrap()).unwrap();
    std::fs::write(&track_path, build_stream(2000)).unwrap();

    let pool = db::connect_memory().await.expect("Failed to open database");
    let pipeline = Arc::new(
        ResetPipeline::new(
            pool,
            Arc::new(FsBlobStore::new(&source_root)),
            Arc::new(FsBlobStore::new(&snippet_root)),
            DurationResolver::new(None, Duration::from_secs(2)),
            5.0,
            vec![ModeConfig {
                name: "classic".to_string(),
                collection: "songs".to_string(),
                catalog: catalog_path,
                salt: String::new(),
            }],
        )
        .expect("Failed to create pipeline"),
    );

    let router = create_router(AppState {
        pipeline: Arc::clone(&pipeline),
        shared_secret: SECRET.to_string(),
        port: 5830,
    });
    (dir, router, pipeline)
}

/// Helper function to make HTTP requests to the test server
async fn make_request(
    app: &axum::Router,
    method: &str,
    path: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    use axum::body::Body;
    use http::{Method, Request};
    use tower::ServiceExt;

    let method = match method {
        "GET" => Method::GET,
        "POST" => Method::POST,
        _ => panic!("Unsupported method"),
    };

    let mut request = Request::builder().method(method).uri(path);
    if let Some(token) = bearer {
        request = request.header("authorization", format!("Bearer {}", token));
    }

    let request = if let Some(json_body) = body {
        request
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap()
    } else {
        request.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_body = if !body.is_empty() {
        Some(serde_json::from_slice(&body).unwrap())
    } else {
        None
    };

    (status, json_body)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, app, _) = setup_test_server().await;

    let (status, body) = make_request(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.expect("Expected response body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "trackle-gen");
    assert!(body["version"].is_string());
    assert_eq!(body["modes"], json!(["classic"]));
}

#[tokio::test]
async fn test_reset_requires_bearer_token() {
    let (_dir, app, _) = setup_test_server().await;

    let request = json!({"mode": "classic", "date": "2024-01-10"});

    // No token at all
    let (status, _) = make_request(&app, "POST", "/api/reset", None, Some(request.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Wrong token
    let (status, _) =
        make_request(&app, "POST", "/api/reset", Some("wrong"), Some(request.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A prefix of the real secret is still wrong
    let (status, _) = make_request(
        &app,
        "POST",
        "/api/reset",
        Some(&SECRET[..SECRET.len() - 1]),
        Some(request),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejected_request_runs_no_pipeline() {
    let (_dir, app, pipeline) = setup_test_server().await;

    let request = json!({"mode": "classic", "date": "2024-01-10"});
    let (status, _) = make_request(&app, "POST", "/api/reset", Some("wrong"), Some(request)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // No execution log, no published state
    let checks = pipeline
        .verify(chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        .await;
    assert!(!checks[0].metadata_exists);
    assert!(!checks[0].blob_exists);
}

#[tokio::test]
async fn test_reset_end_to_end() {
    let (_dir, app, pipeline) = setup_test_server().await;

    let request = json!({"mode": "classic", "date": "2024-01-10"});
    let (status, body) =
        make_request(&app, "POST", "/api/reset", Some(SECRET), Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.expect("Expected response body");
    assert_eq!(body["success"], true);
    assert_eq!(body["song_name"], "Only Song");
    assert_eq!(body["snippet_key"], "songs/2024-1-10.mp3");
    assert!(body["start_timestamp"].as_str().unwrap().contains(':'));

    let checks = pipeline
        .verify(chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        .await;
    assert!(checks[0].all_good);
}

#[tokio::test]
async fn test_reset_unknown_mode() {
    let (_dir, app, _) = setup_test_server().await;

    let request = json!({"mode": "jazz", "date": "2024-01-10"});
    let (status, body) =
        make_request(&app, "POST", "/api/reset", Some(SECRET), Some(request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["success"], false);
}

#[tokio::test]
async fn test_reset_rejects_recovery_trigger() {
    let (_dir, app, pipeline) = setup_test_server().await;

    // The recovery trigger belongs to the verification sweep; API callers
    // may only claim cron or manual.
    let request = json!({"mode": "classic", "date": "2024-01-10", "triggered_by": "recovery"});
    let (status, body) =
        make_request(&app, "POST", "/api/reset", Some(SECRET), Some(request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["success"], false);

    let checks = pipeline
        .verify(chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        .await;
    assert!(!checks[0].metadata_exists);
    assert!(!checks[0].blob_exists);
}

#[tokio::test]
async fn test_reset_accepts_cron_trigger() {
    let (_dir, app, _) = setup_test_server().await;

    let request = json!({"mode": "classic", "date": "2024-01-10", "triggered_by": "cron"});
    let (status, body) =
        make_request(&app, "POST", "/api/reset", Some(SECRET), Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["success"], true);
}

#[tokio::test]
async fn test_reset_invalid_date() {
    let (_dir, app, _) = setup_test_server().await;

    let request = json!({"mode": "classic", "date": "01/10/2024"});
    let (status, _) = make_request(&app, "POST", "/api/reset", Some(SECRET), Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_missing_source() {
    let (dir, app, _) = setup_test_server().await;
    std::fs::remove_file(dir.path().join("sources/songs/Only Song.mp3")).unwrap();

    let request = json!({"mode": "classic", "date": "2024-01-10"});
    let (status, body) =
        make_request(&app, "POST", "/api/reset", Some(SECRET), Some(request)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.unwrap()["success"], false);
}

#[tokio::test]
async fn test_verify_endpoint_recovers() {
    let (_dir, app, pipeline) = setup_test_server().await;

    let request = json!({"date": "2024-01-11"});
    let (status, body) =
        make_request(&app, "POST", "/api/verify", Some(SECRET), Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.expect("Expected response body");
    assert_eq!(body["recovery_needed"], true);
    assert_eq!(body["recoveries"][0]["recovered"], true);

    let checks = pipeline
        .verify(chrono::NaiveDate::from_ymd_opt(2024, 1, 11).unwrap())
        .await;
    assert!(checks[0].all_good);
}

#[tokio::test]
async fn test_verify_requires_bearer_token() {
    let (_dir, app, _) = setup_test_server().await;

    let (status, _) = make_request(&app, "POST", "/api/verify", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reset_is_deterministic_across_requests() {
    let (_dir, app, _) = setup_test_server().await;

    let request = json!({"mode": "classic", "date": "2024-01-10"});
    let (_, first) =
        make_request(&app, "POST", "/api/reset", Some(SECRET), Some(request.clone())).await;
    let (_, second) = make_request(&app, "POST", "/api/reset", Some(SECRET), Some(request)).await;

    let first = first.unwrap();
    let second = second.unwrap();
    assert_eq!(first["song_name"], second["song_name"]);
    assert_eq!(first["start_timestamp"], second["start_timestamp"]);
    assert_eq!(first["end_timestamp"], second["end_timestamp"]);
}

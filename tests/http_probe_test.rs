//! HTTP probe against a local mock server
//!
//! Every test binds its own axum server on an ephemeral port, so no network
//! access is needed.

use axum::{Router, http::StatusCode, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use pingbox::probe::{HttpProbe, HttpProbeConfig};
use pingbox::{Job, Pool, Probe};

/// Start mock HTTP server with a few canned routes
async fn start_mock_server() -> String {
    let app = Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route(
            "/boom",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        )
        .route("/redirect", get(|| async { axum::response::Redirect::temporary("/ok") }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn probe(fail_on_error_status: bool) -> HttpProbe {
    HttpProbe::new(HttpProbeConfig {
        fail_on_error_status,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_success_records_status() {
    let base = start_mock_server().await;
    let url = format!("{}/ok", base);

    let result = probe(false).probe(&Job::new(&url), Duration::from_secs(2)).await;

    assert!(result.is_success(), "unexpected failure: {}", result);
    assert_eq!(result.status(), Some(200));
    assert_eq!(result.url, url);
    assert!(result.to_string().starts_with("[SUCCESS]"));
}

#[tokio::test]
async fn test_error_status_is_recorded_by_default() {
    let base = start_mock_server().await;

    let boom = probe(false)
        .probe(&Job::new(format!("{}/boom", base)), Duration::from_secs(2))
        .await;
    assert_eq!(boom.status(), Some(500));

    let missing = probe(false)
        .probe(&Job::new(format!("{}/missing", base)), Duration::from_secs(2))
        .await;
    assert_eq!(missing.status(), Some(404));
}

#[tokio::test]
async fn test_error_status_fails_when_configured() {
    let base = start_mock_server().await;

    let result = probe(true)
        .probe(&Job::new(format!("{}/boom", base)), Duration::from_secs(2))
        .await;

    assert!(!result.is_success());
    assert_eq!(result.error(), Some("HTTP 500: Internal Server Error"));
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let base = start_mock_server().await;

    let result = probe(false)
        .probe(&Job::new(format!("{}/redirect", base)), Duration::from_secs(2))
        .await;

    assert_eq!(result.status(), Some(200));
}

#[tokio::test]
async fn test_timeout_is_a_failure() {
    let base = start_mock_server().await;

    let started = std::time::Instant::now();
    let result = probe(false)
        .probe(&Job::new(format!("{}/slow", base)), Duration::from_millis(200))
        .await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("timed out"), "got: {}", result);
}

#[tokio::test]
async fn test_connection_refused_is_a_failure() {
    // Grab a free port, then close it again
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = probe(false)
        .probe(&Job::new(format!("http://{}/", addr)), Duration::from_secs(1))
        .await;

    assert!(!result.is_success());
    assert!(result.to_string().starts_with("[ERROR]"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pool_with_http_probe() {
    let base = start_mock_server().await;
    let (tx, mut rx) = mpsc::channel(16);
    let pool = Pool::new(2, Duration::from_millis(500), tx, Arc::new(probe(true))).unwrap();
    pool.init().unwrap();

    for path in ["ok", "ok", "boom", "ok", "slow"] {
        pool.push(Job::new(format!("{}/{}", base, path))).await;
    }
    pool.stop().await.unwrap();

    let mut results = Vec::new();
    while let Some(result) = rx.recv().await {
        results.push(result);
    }

    assert_eq!(results.len(), 5);
    assert_eq!(results.iter().filter(|r| r.is_success()).count(), 3);
    assert_eq!(results.iter().filter(|r| !r.is_success()).count(), 2);
}

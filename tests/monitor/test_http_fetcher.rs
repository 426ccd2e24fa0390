// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{http::HeaderMap, http::StatusCode, response::Html, routing::get, Router};
use fabstir_page_monitor::monitor::fetcher::{
    FetchError, FetchOutcome, HttpFetcher, PageFetcher, DEFAULT_USER_AGENT,
};
use std::time::Duration;

async fn spawn_server() -> String {
    let app = Router::new()
        .route(
            "/ok",
            get(|| async { Html("<html><body><p>Hello from the test server.</p></body></html>") }),
        )
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "gone") }))
        .route(
            "/error",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        )
        .route(
            "/ua",
            get(|headers: HeaderMap| async move {
                headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_fetch_success_returns_body() {
    let base = spawn_server().await;
    let fetcher = HttpFetcher::with_defaults().unwrap();

    let outcome = fetcher.fetch(&format!("{}/ok", base)).await.unwrap();
    match outcome {
        FetchOutcome::Content(body) => assert!(body.contains("Hello from the test server.")),
        other => panic!("expected content, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_non_success_is_not_error() {
    let base = spawn_server().await;
    let fetcher = HttpFetcher::with_defaults().unwrap();

    let missing = fetcher.fetch(&format!("{}/missing", base)).await.unwrap();
    assert_eq!(missing, FetchOutcome::NonSuccess(404));

    let failed = fetcher.fetch(&format!("{}/error", base)).await.unwrap();
    assert_eq!(failed, FetchOutcome::NonSuccess(500));
}

#[tokio::test]
async fn test_fetch_timeout_is_error() {
    let base = spawn_server().await;
    let fetcher = HttpFetcher::new(Duration::from_millis(300), DEFAULT_USER_AGENT).unwrap();

    let result = fetcher.fetch(&format!("{}/slow", base)).await;
    assert!(matches!(result, Err(FetchError::Timeout(_))));
}

#[tokio::test]
async fn test_fetch_sends_user_agent() {
    let base = spawn_server().await;
    let fetcher = HttpFetcher::with_defaults().unwrap();

    let outcome = fetcher.fetch(&format!("{}/ua", base)).await.unwrap();
    assert_eq!(outcome, FetchOutcome::Content(DEFAULT_USER_AGENT.to_string()));
}

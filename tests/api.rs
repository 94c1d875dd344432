//! HTTP route tests driven through `tower::ServiceExt::oneshot`.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{test_config, write_corpus, MockCompletion, MockEmbedder};
use rag_pipeline::api::{create_api, ApiResponse, HealthResponse, QueryResponse, ServiceInfo};
use rag_pipeline::RagSystem;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

async fn app_with(completion: MockCompletion, files: &[(&str, &str)]) -> (Router, TempDir) {
    let dir = tempdir().unwrap();
    write_corpus(dir.path(), files);
    let config = test_config(dir.path(), 20, 5, 2);
    let rag = RagSystem::build(&config, Arc::new(MockEmbedder::default()), Arc::new(completion))
        .await
        .unwrap();
    (create_api(Arc::new(rag), 2), dir)
}

async fn default_app() -> (Router, TempDir) {
    app_with(
        MockCompletion::answering("Kai solved it."),
        &[
            ("kai.txt", "Kai answered the riddle."),
            ("other.txt", "Nothing to see here."),
        ],
    )
    .await
}

fn post_query(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_describes_usage() {
    let (app, _dir) = default_app().await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let info: ServiceInfo = read_json(response).await;
    assert!(info.usage.contains("/api/query"));
}

#[tokio::test]
async fn test_health_reports_index_size() {
    let (app, _dir) = default_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = read_json(response).await;
    assert_eq!(health.status, "ok");
    assert_eq!(health.documents, 2);
    assert!(health.chunks >= 2);
}

#[tokio::test]
async fn test_query_returns_answer_and_sources() {
    let (app, _dir) = default_app().await;

    let response = app
        .oneshot(post_query(json!({ "question": "Kai answered the riddle.", "top_k": 1 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: QueryResponse = read_json(response).await;
    assert_eq!(body.answer, "Kai solved it.");
    assert_eq!(body.sources.len(), 1);
    assert_eq!(body.sources[0].source, "kai.txt");
}

#[tokio::test]
async fn test_invalid_request_is_unprocessable() {
    let (app, _dir) = default_app().await;

    let response = app
        .oneshot(post_query(json!({ "question": "" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_body_gets_status_message() {
    let (app, _dir) = default_app().await;

    let response = app
        .oneshot(post_query(json!({ "top_k": 2 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ApiResponse = read_json(response).await;
    assert!(body.status.contains("question"));
}

#[tokio::test]
async fn test_non_json_body_gets_status_message() {
    let (app, _dir) = default_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from("question=hello"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ApiResponse = read_json(response).await;
    assert!(!body.status.is_empty());
}

#[tokio::test]
async fn test_completion_failure_maps_to_bad_gateway() {
    let (app, _dir) = app_with(MockCompletion::failing(), &[("a.txt", "some text")]).await;

    let response = app
        .oneshot(post_query(json!({ "question": "what text?" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: ApiResponse = read_json(response).await;
    assert!(body.status.contains("rate limit"));
}

#[tokio::test]
async fn test_empty_index_maps_to_service_unavailable() {
    let (app, _dir) = app_with(MockCompletion::answering("unused"), &[]).await;

    let response = app
        .oneshot(post_query(json!({ "question": "anyone there?" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

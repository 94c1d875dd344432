use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use validator::Validate;

use crate::config::format_validation_errors;
use crate::error::RagError;
use crate::llm::{RagSystem, SearchResult};

#[derive(Clone)]
pub struct AppState {
    rag: Arc<RagSystem>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    #[validate(range(min = 1, max = 50))]
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<SearchResult>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServiceInfo {
    pub message: String,
    pub usage: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub documents: usize,
    pub chunks: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiResponse {
    pub status: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiResponse>)>;

/// Create and configure the API router
pub fn create_api(rag: Arc<RagSystem>, max_concurrent_requests: usize) -> Router {
    let state = AppState { rag };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/api/query", post(query_handler))
        .layer(ConcurrencyLimitLayer::new(max_concurrent_requests.max(1)))
        .layer(cors)
        .with_state(state)
}

fn error_status(err: &RagError) -> StatusCode {
    match err {
        RagError::Configuration(_) => StatusCode::BAD_REQUEST,
        RagError::ExternalService { .. } => StatusCode::BAD_GATEWAY,
        RagError::EmptyIndex => StatusCode::SERVICE_UNAVAILABLE,
        RagError::FileAccess { .. } | RagError::DimensionMismatch { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(status: StatusCode, message: String) -> (StatusCode, Json<ApiResponse>) {
    (status, Json(ApiResponse { status: message }))
}

async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "RAG API is running".to_string(),
        usage: "Send POST requests to /api/query with a JSON body containing 'question'"
            .to_string(),
    })
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.rag.stats();
    Json(HealthResponse {
        status: "ok".to_string(),
        documents: stats.documents,
        chunks: stats.chunks,
    })
}

async fn query_handler(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<QueryResponse> {
    let Json(request) = payload
        .map_err(|e| error_response(StatusCode::UNPROCESSABLE_ENTITY, e.body_text()))?;
    request.validate().map_err(|e| {
        error_response(StatusCode::UNPROCESSABLE_ENTITY, format_validation_errors(&e))
    })?;

    info!("Received query ({} chars)", request.question.len());

    match state
        .rag
        .answer_with_sources(&request.question, request.top_k)
        .await
    {
        Ok(answer) => Ok(Json(QueryResponse {
            answer: answer.answer,
            sources: answer.sources,
        })),
        Err(e) => {
            error!("Error processing query: {}", e);
            Err(error_response(error_status(&e), e.to_string()))
        }
    }
}

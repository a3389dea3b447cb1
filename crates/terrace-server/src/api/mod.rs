mod analyze;
mod insights;
mod search;

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use terrace_engine::{EngineError, Pipeline, Session};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub pipeline: Arc<Pipeline>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    /// Whether an analyzed snapshot with at least one row is loaded.
    ready: bool,
    snapshot_version: Option<u64>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" | "not_ready" => StatusCode::BAD_REQUEST,
            "provider_failure" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> usize {
    let clamped = limit.unwrap_or(50).clamp(1, 200);
    usize::try_from(clamped).unwrap_or(50)
}

pub(super) fn map_engine_error(request_id: String, error: &EngineError) -> ApiError {
    match error {
        EngineError::InvalidInput(_) => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        EngineError::NotReady => ApiError::new(
            request_id,
            "not_ready",
            "no data analyzed yet; POST /api/v1/analyze first",
        ),
        EngineError::ProviderFailure { .. } | EngineError::StageShape { .. } => {
            tracing::error!(error = %error, stage = ?error.stage(), "batch aborted");
            ApiError::new(request_id, "provider_failure", error.to_string())
        }
        EngineError::ColumnConflict { .. } | EngineError::IncompleteBatch { .. } => {
            tracing::error!(error = %error, "batch assembly failed");
            ApiError::new(request_id, "internal_error", "batch assembly failed")
        }
    }
}

pub(super) fn map_json_rejection(request_id: String, rejection: &JsonRejection) -> ApiError {
    ApiError::new(request_id, "validation_error", rejection.body_text())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/analyze", post(analyze::analyze_batch))
        .route("/api/v1/search", post(search::search_opinions))
        .route(
            "/api/v1/comments/{comment_id}/context",
            get(search::comment_context),
        )
        .route("/api/v1/topics", get(insights::list_topics))
        .route("/api/v1/stats", get(insights::get_statistics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let snapshot = state.session.current();
    Json(ApiResponse::new(
        req_id.0,
        HealthData {
            status: "ok",
            ready: snapshot.as_ref().is_some_and(|s| !s.is_empty()),
            snapshot_version: snapshot.map(|s| s.version),
        },
    ))
}

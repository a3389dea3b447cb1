use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde::Serialize;
use serde_json::Value;
use terrace_engine::BatchSummary;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_engine_error, map_json_rejection, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeResult {
    pub batch_id: Uuid,
    pub snapshot_version: u64,
    #[serde(flatten)]
    pub summary: BatchSummary,
}

/// Run the full pipeline over a posted batch and swap in the new snapshot.
pub(super) async fn analyze_batch(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalyzeResult>>, ApiError> {
    let Json(input) = payload.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;

    let snapshot = state
        .session
        .run_batch(&state.pipeline, &input)
        .await
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    let summary = snapshot.summary();
    Ok(Json(ApiResponse::new(
        req_id.0,
        AnalyzeResult {
            batch_id: snapshot.batch_id,
            snapshot_version: snapshot.version,
            summary,
        },
    )))
}

use axum::{extract::State, Extension, Json};
use serde::Serialize;
use terrace_core::TopicInfo;
use terrace_engine::Statistics;

use crate::middleware::RequestId;

use super::{map_engine_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct TopicList {
    pub total_topics: usize,
    pub topics: Vec<TopicInfo>,
}

pub(super) async fn list_topics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<TopicList>>, ApiError> {
    let topics = state
        .session
        .topics()
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        TopicList {
            total_topics: topics.len(),
            topics,
        },
    )))
}

pub(super) async fn get_statistics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Statistics>>, ApiError> {
    let stats = state
        .session
        .statistics()
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, stats)))
}

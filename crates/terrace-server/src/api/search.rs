use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use terrace_core::{AnnotatedComment, EntityMention, SentimentLabel};
use terrace_engine::SearchQuery;

use crate::middleware::RequestId;

use super::{
    map_engine_error, map_json_rejection, normalize_limit, ApiError, ApiResponse, AppState,
};

const DEFAULT_CONTEXT_WINDOW: usize = 3;
const MAX_CONTEXT_WINDOW: usize = 20;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SearchRequest {
    pub query: Option<String>,
    pub sentiment: Option<String>,
    pub emotion: Option<String>,
    pub min_intensity: Option<f64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct OpinionItem {
    pub comment_id: String,
    pub post_id: String,
    pub text: String,
    pub author: String,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    pub emotion: String,
    pub opinion_score: f64,
    pub opinion_intensity: f64,
    pub entities: Vec<EntityMention>,
    pub mentioned_players: Vec<String>,
    pub mentioned_teams: Vec<String>,
    pub topic_id: i32,
    pub timestamp: i64,
    pub engagement_score: i64,
}

impl From<&AnnotatedComment> for OpinionItem {
    fn from(c: &AnnotatedComment) -> Self {
        Self {
            comment_id: c.record.comment_id.clone(),
            post_id: c.record.post_id.clone(),
            text: c.record.text.clone(),
            author: c.record.author.clone(),
            sentiment: c.sentiment_a,
            confidence: c.sentiment_a_confidence,
            emotion: c.primary_emotion.clone(),
            opinion_score: c.opinion_score,
            opinion_intensity: c.opinion_intensity,
            entities: c.entities.all_entities.clone(),
            mentioned_players: c.entities.persons.clone(),
            mentioned_teams: c.entities.organizations.clone(),
            topic_id: c.topic_id,
            timestamp: c.record.timestamp,
            engagement_score: c.record.engagement_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResults {
    pub total_results: usize,
    pub query: SearchQuery,
    pub opinions: Vec<OpinionItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ContextParams {
    pub window: Option<usize>,
}

/// Validate a request into an engine query.
fn to_query(request: SearchRequest) -> Result<SearchQuery, String> {
    let sentiment = request
        .sentiment
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<SentimentLabel>)
        .transpose()?;

    let min_intensity = request.min_intensity.unwrap_or(0.0);
    if !(0.0..=1.0).contains(&min_intensity) {
        return Err(format!(
            "min_intensity must be between 0 and 1, got {min_intensity}"
        ));
    }

    Ok(SearchQuery {
        query: request.query,
        sentiment,
        emotion: request.emotion.filter(|e| !e.trim().is_empty()),
        min_intensity,
        limit: Some(normalize_limit(request.limit)),
    })
}

pub(super) async fn search_opinions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SearchResults>>, ApiError> {
    let Json(request) = payload.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;
    let query = to_query(request)
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;

    let opinions: Vec<OpinionItem> = state
        .session
        .search(&query)
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?
        .iter()
        .map(OpinionItem::from)
        .collect();

    Ok(Json(ApiResponse::new(
        req_id.0,
        SearchResults {
            total_results: opinions.len(),
            query,
            opinions,
        },
    )))
}

/// A comment and its neighbours in table order.
pub(super) async fn comment_context(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(comment_id): Path<String>,
    Query(params): Query<ContextParams>,
) -> Result<Json<ApiResponse<Vec<OpinionItem>>>, ApiError> {
    let window = params
        .window
        .unwrap_or(DEFAULT_CONTEXT_WINDOW)
        .min(MAX_CONTEXT_WINDOW);
    let rows = state
        .session
        .context(&comment_id, window)
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("comment '{comment_id}' not found"),
            )
        })?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        rows.iter().map(OpinionItem::from).collect(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_query_applies_default_limit() {
        let query = to_query(SearchRequest::default()).unwrap();
        assert_eq!(query.limit, Some(50));
        assert_eq!(query.min_intensity, 0.0);
        assert!(query.sentiment.is_none());
    }

    #[test]
    fn to_query_parses_sentiment() {
        let query = to_query(SearchRequest {
            sentiment: Some("Negative".to_string()),
            ..SearchRequest::default()
        })
        .unwrap();
        assert_eq!(query.sentiment, Some(SentimentLabel::Negative));
    }

    #[test]
    fn to_query_rejects_unknown_sentiment() {
        let err = to_query(SearchRequest {
            sentiment: Some("furious".to_string()),
            ..SearchRequest::default()
        })
        .unwrap_err();
        assert!(err.contains("furious"));
    }

    #[test]
    fn to_query_rejects_out_of_range_intensity() {
        assert!(to_query(SearchRequest {
            min_intensity: Some(1.5),
            ..SearchRequest::default()
        })
        .is_err());
        assert!(to_query(SearchRequest {
            min_intensity: Some(f64::NAN),
            ..SearchRequest::default()
        })
        .is_err());
    }
}

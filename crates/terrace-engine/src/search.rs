//! Filtering and ranking over an annotated table.

use serde::{Deserialize, Serialize};
use terrace_core::{AnnotatedComment, SentimentLabel};

/// Search parameters. Every active filter must match (logical AND).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Case-insensitive literal substring of the cleaned text. Empty or
    /// absent means no text filter.
    pub query: Option<String>,
    /// Exact match on the classifier sentiment.
    pub sentiment: Option<SentimentLabel>,
    /// Exact match on the primary emotion.
    pub emotion: Option<String>,
    /// Keep rows whose opinion intensity is at least this value.
    pub min_intensity: f64,
    /// Truncate after ranking.
    pub limit: Option<usize>,
}

impl SearchQuery {
    fn matches(&self, comment: &AnnotatedComment, needle: Option<&str>) -> bool {
        if let Some(needle) = needle {
            if !comment.record.text.to_lowercase().contains(needle) {
                return false;
            }
        }
        if self.sentiment.is_some_and(|s| s != comment.sentiment_a) {
            return false;
        }
        if self
            .emotion
            .as_deref()
            .is_some_and(|e| e != comment.primary_emotion)
        {
            return false;
        }
        comment.opinion_intensity >= self.min_intensity
    }
}

/// Rows matching `query`, highest opinion score first.
///
/// Equal scores keep their table order, so repeated calls return identical
/// results.
#[must_use]
pub(crate) fn search<'a>(
    comments: &'a [AnnotatedComment],
    query: &SearchQuery,
) -> Vec<&'a AnnotatedComment> {
    let needle = query
        .query
        .as_deref()
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let mut hits: Vec<&AnnotatedComment> = comments
        .iter()
        .filter(|c| query.matches(c, needle.as_deref()))
        .collect();

    // Stable sort: ties stay in table order.
    hits.sort_by(|a, b| b.opinion_score.total_cmp(&a.opinion_score));

    if let Some(limit) = query.limit {
        hits.truncate(limit);
    }
    hits
}

/// The comment with `comment_id` plus up to `window` neighbours on each side,
/// in table order.
#[must_use]
pub(crate) fn context_window<'a>(
    comments: &'a [AnnotatedComment],
    comment_id: &str,
    window: usize,
) -> Option<&'a [AnnotatedComment]> {
    let idx = comments
        .iter()
        .position(|c| c.record.comment_id == comment_id)?;
    let start = idx.saturating_sub(window);
    let end = (idx + window + 1).min(comments.len());
    Some(&comments[start..end])
}

//! Flattening of raw post/comment JSON into [`CommentRecord`]s.
//!
//! Malformed records are logged and skipped; comments whose cleaned text is
//! shorter than [`MIN_TEXT_CHARS`] are dropped silently. A `null` body counts
//! as empty text.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Timelike};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use terrace_core::CommentRecord;

use crate::error::{DataFormatError, EngineError};

/// Minimum length of cleaned comment text, in characters.
pub const MIN_TEXT_CHARS: usize = 10;

const NO_FLAIR: &str = "neutral";

static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,!?;:()\-]").expect("valid regex"));
static WHITESPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Deserialize)]
struct RawInput {
    #[serde(default)]
    posts: Vec<Value>,
}

#[derive(Deserialize)]
struct RawPost {
    post_id: Option<String>,
    subreddit: Option<String>,
    title: Option<String>,
    created_utc: Option<f64>,
    #[serde(default)]
    comments: Vec<Value>,
}

#[derive(Deserialize)]
struct RawComment {
    id: Option<String>,
    author: Option<String>,
    /// Outer `None` when the key is absent, inner `None` for an explicit `null`.
    #[serde(default, deserialize_with = "present")]
    body: Option<Option<String>>,
    score: Option<i64>,
    created_utc: Option<f64>,
    parent_id: Option<String>,
    user_flair: Option<String>,
    #[serde(default)]
    replies: Vec<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Post-level fields copied onto each of its comments.
struct PostContext {
    post_id: String,
    subreddit: String,
    title: String,
    created_utc: Option<i64>,
}

/// Result of flattening one raw batch.
#[derive(Debug, Default)]
pub struct LoadedComments {
    /// Retained comments, posts in input order, comments depth-first.
    pub records: Vec<CommentRecord>,
    /// Records skipped with a [`DataFormatError`].
    pub skipped: usize,
}

/// Strip everything but word characters, whitespace and basic punctuation,
/// then collapse whitespace.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let stripped = DISALLOWED_CHARS.replace_all(text, "");
    WHITESPACE_RUNS.replace_all(&stripped, " ").trim().to_string()
}

/// Flatten `{ "posts": [...] }` into comment records.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] when the payload is not an object
/// or `posts` is not an array. Individual bad records are skipped instead.
pub fn load_comments(input: &Value) -> Result<LoadedComments, EngineError> {
    if !input.is_object() {
        return Err(EngineError::InvalidInput(serde::de::Error::custom(
            "expected a JSON object with a `posts` array",
        )));
    }
    let raw = RawInput::deserialize(input).map_err(EngineError::InvalidInput)?;

    let mut loaded = LoadedComments::default();
    for (index, post) in raw.posts.into_iter().enumerate() {
        match parse_post(post, index) {
            Ok((context, comments)) => {
                for comment in comments {
                    flatten_comment(comment, &context, 0, &mut loaded);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping post");
                loaded.skipped += 1;
            }
        }
    }

    tracing::info!(
        retained = loaded.records.len(),
        skipped = loaded.skipped,
        "comments loaded"
    );
    Ok(loaded)
}

fn parse_post(value: Value, index: usize) -> Result<(PostContext, Vec<Value>), DataFormatError> {
    let post: RawPost = serde_json::from_value(value).map_err(|source| DataFormatError::Malformed {
        context: format!("post #{index}"),
        source,
    })?;
    let post_id = post.post_id.ok_or_else(|| DataFormatError::MissingField {
        record: format!("post #{index}"),
        field: "post_id",
    })?;

    Ok((
        PostContext {
            post_id,
            subreddit: post.subreddit.unwrap_or_default(),
            title: post.title.unwrap_or_default(),
            created_utc: post.created_utc.map(epoch_seconds),
        },
        post.comments,
    ))
}

/// Depth-first: a comment is emitted before its replies.
fn flatten_comment(value: Value, post: &PostContext, depth: usize, out: &mut LoadedComments) {
    let mut comment: RawComment = match serde_json::from_value(value) {
        Ok(c) => c,
        Err(source) => {
            let e = DataFormatError::Malformed {
                context: format!("comment in post {}", post.post_id),
                source,
            };
            tracing::warn!(error = %e, "skipping comment");
            out.skipped += 1;
            return;
        }
    };

    let replies = std::mem::take(&mut comment.replies);
    match to_record(comment, post, depth) {
        Ok(Some(record)) => out.records.push(record),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "skipping comment");
            out.skipped += 1;
        }
    }

    for reply in replies {
        flatten_comment(reply, post, depth + 1, out);
    }
}

/// `Ok(None)` means the comment was valid but too short to keep.
fn to_record(
    comment: RawComment,
    post: &PostContext,
    depth: usize,
) -> Result<Option<CommentRecord>, DataFormatError> {
    let missing = |field: &'static str| DataFormatError::MissingField {
        record: format!(
            "comment {} in post {}",
            comment.id.as_deref().unwrap_or("<unknown>"),
            post.post_id
        ),
        field,
    };
    let comment_id = comment.id.clone().ok_or_else(|| missing("id"))?;
    let author = comment.author.clone().ok_or_else(|| missing("author"))?;
    let body = comment
        .body
        .clone()
        .ok_or_else(|| missing("body"))?
        .unwrap_or_default();

    let text = clean_text(&body);
    if text.chars().count() < MIN_TEXT_CHARS {
        return Ok(None);
    }

    let timestamp = comment.created_utc.map_or(0, epoch_seconds);
    let datetime = DateTime::from_timestamp(timestamp, 0).unwrap_or_default();

    let flair = comment.user_flair.filter(|f| !f.trim().is_empty());
    let is_reply = depth > 0 || comment.parent_id.is_some_and(|p| !p.is_empty());

    Ok(Some(CommentRecord {
        comment_id,
        post_id: post.post_id.clone(),
        subreddit: post.subreddit.clone(),
        post_title: post.title.clone(),
        post_time: post.created_utc.unwrap_or(0),
        author,
        comment_length: body.chars().count(),
        word_count: body.split_whitespace().count(),
        text,
        original_text: body,
        engagement_score: comment.score.unwrap_or(0),
        timestamp,
        hour: datetime.hour(),
        day_of_week: datetime.weekday().num_days_from_monday(),
        has_flair: flair.is_some(),
        team_affiliation: flair.unwrap_or_else(|| NO_FLAIR.to_string()),
        is_reply,
    }))
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_seconds(value: f64) -> i64 {
    value as i64
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;

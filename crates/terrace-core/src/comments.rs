use serde::{Deserialize, Serialize};

/// One retained comment, flattened out of its post thread, before any
/// annotation has been attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Comment ID from the source platform. Unique within a batch.
    pub comment_id: String,
    pub post_id: String,
    pub subreddit: String,
    pub post_title: String,
    /// Post creation time, epoch seconds.
    pub post_time: i64,
    /// Author name; may be a deletion sentinel such as `"[deleted]"`.
    pub author: String,
    /// Cleaned text. Always at least 10 characters.
    pub text: String,
    /// Raw comment body exactly as received.
    pub original_text: String,
    /// Community score (upvotes minus downvotes). May be negative.
    pub engagement_score: i64,
    /// Comment creation time, epoch seconds.
    pub timestamp: i64,
    /// UTC hour of day, 0-23.
    pub hour: u32,
    /// UTC day of week, 0 = Monday .. 6 = Sunday.
    pub day_of_week: u32,
    /// Character count of the raw body.
    pub comment_length: usize,
    /// Whitespace-separated word count of the raw body.
    pub word_count: usize,
    pub has_flair: bool,
    /// User flair, or `"neutral"` when the author has none.
    pub team_affiliation: String,
    pub is_reply: bool,
}

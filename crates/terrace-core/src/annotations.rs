//! Annotation value types shared by the providers and the engine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::comments::CommentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            "positive" => Ok(SentimentLabel::Positive),
            other => Err(format!(
                "invalid sentiment '{other}'; expected negative, neutral, or positive"
            )),
        }
    }
}

/// Strength-of-feeling bucket derived from opinion intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpinionStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl OpinionStrength {
    /// Bucket an intensity in `[0, 1]`.
    #[must_use]
    pub fn from_intensity(intensity: f64) -> Self {
        if intensity >= 0.7 {
            OpinionStrength::VeryStrong
        } else if intensity >= 0.4 {
            OpinionStrength::Strong
        } else if intensity >= 0.1 {
            OpinionStrength::Moderate
        } else {
            OpinionStrength::Weak
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    /// NER label as emitted by the extractor, e.g. `PERSON`, `ORG`, `GPE`.
    pub label: String,
}

/// Entities found in one comment.
///
/// Only `PERSON`, `ORG` and `EVENT` mentions are promoted to the typed lists;
/// every mention, whatever its label, stays in `all_entities`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMentions {
    pub persons: Vec<String>,
    pub organizations: Vec<String>,
    pub events: Vec<String>,
    pub all_entities: Vec<EntityMention>,
}

impl EntityMentions {
    /// Build typed lists from raw extractor output, preserving mention order.
    #[must_use]
    pub fn from_mentions(all_entities: Vec<EntityMention>) -> Self {
        let mut mentions = EntityMentions::default();
        for entity in &all_entities {
            match entity.label.as_str() {
                "PERSON" => mentions.persons.push(entity.text.clone()),
                "ORG" => mentions.organizations.push(entity.text.clone()),
                "EVENT" => mentions.events.push(entity.text.clone()),
                _ => {}
            }
        }
        mentions.all_entities = all_entities;
        mentions
    }
}

/// One row of a discovered-topic summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicInfo {
    /// `-1` is the outlier bucket.
    pub topic_id: i32,
    pub count: usize,
    /// Human-readable name, e.g. `"0_haaland_goal_hattrick_city"`.
    pub name: String,
    pub representative_terms: Vec<String>,
    pub representative_texts: Vec<String>,
}

/// A comment with every annotation attached.
///
/// Rows of this type only exist once all stages of a batch have succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedComment {
    #[serde(flatten)]
    pub record: CommentRecord,

    pub sentiment_a: SentimentLabel,
    pub sentiment_a_confidence: f64,
    /// Per-class probabilities, ordered negative, neutral, positive.
    pub sentiment_a_scores: [f64; 3],

    pub sentiment_b_label: SentimentLabel,
    pub sentiment_b_compound: f64,
    pub sentiment_b_positive: f64,
    pub sentiment_b_neutral: f64,
    pub sentiment_b_negative: f64,
    pub opinion_intensity: f64,
    pub opinion_strength: OpinionStrength,

    pub primary_emotion: String,
    pub emotions: Vec<EmotionScore>,

    pub entities: EntityMentions,

    pub topic_id: i32,
    pub topic_probability: f64,

    pub opinion_score: f64,
}

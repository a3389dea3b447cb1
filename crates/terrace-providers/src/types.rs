use std::collections::BTreeMap;

use terrace_core::{EmotionScore, SentimentLabel, TopicInfo};

/// Output of the sentiment classifier for one text.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentPrediction {
    pub label: SentimentLabel,
    /// Probability of `label`, in `[0, 1]`.
    pub confidence: f64,
    /// Per-class probabilities, ordered negative, neutral, positive.
    pub scores: [f64; 3],
}

/// Output of the lexicon polarity analyzer for one text.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarityScores {
    pub label: SentimentLabel,
    /// Normalized compound valence in `[-1, 1]`.
    pub compound: f64,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    /// `|compound|`.
    pub intensity: f64,
}

/// Output of the emotion classifier for one text.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionPrediction {
    /// Highest-scoring labels, descending, at most `top_k`.
    pub top_emotions: Vec<EmotionScore>,
    /// First entry of `top_emotions`, or `"neutral"` when empty.
    pub primary_label: String,
    pub all_scores: BTreeMap<String, f64>,
}

/// Topic discovery result for a whole batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopicAssignment {
    /// One topic id per input text; `-1` marks outliers.
    pub topic_ids: Vec<i32>,
    /// One membership probability per input text.
    pub probabilities: Vec<f64>,
    pub summary: Vec<TopicInfo>,
}

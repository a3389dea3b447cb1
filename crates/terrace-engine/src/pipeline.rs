//! Six-stage annotation pipeline.

use std::fmt;
use std::future::Future;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use terrace_core::{AnnotatedComment, AppConfig, TopicInfo};
use terrace_providers::{EmotionPrediction, ProviderError, ProviderSet};

use crate::error::EngineError;
use crate::loader::load_comments;
use crate::scoring::ScoringPolicy;
use crate::stats::{batch_summary, BatchSummary};
use crate::table::{EmotionAnnotation, TableBuilder, TopicMembership};

/// Label used when no emotion clears the threshold.
pub const FALLBACK_EMOTION: &str = "neutral";

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Load,
    Sentiment,
    Lexicon,
    Emotion,
    Entities,
    Topics,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Sentiment => "sentiment",
            Stage::Lexicon => "lexicon",
            Stage::Emotion => "emotion",
            Stage::Entities => "entities",
            Stage::Topics => "topics",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Labels requested from the emotion provider per text.
    pub emotion_top_k: usize,
    /// Minimum score for an emotion label to be kept.
    pub emotion_threshold: f64,
    pub scoring: ScoringPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            emotion_top_k: 3,
            emotion_threshold: 0.3,
            scoring: ScoringPolicy::default(),
        }
    }
}

impl PipelineOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            emotion_top_k: config.emotion_top_k,
            emotion_threshold: config.emotion_threshold,
            scoring: ScoringPolicy {
                engagement_cap: config.engagement_cap,
                ..ScoringPolicy::default()
            },
        }
    }
}

/// Output of one successful batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotatedBatch {
    /// Fully annotated comments in original table order.
    pub comments: Vec<AnnotatedComment>,
    pub topics: Vec<TopicInfo>,
    /// Raw records skipped as malformed while loading.
    pub skipped_records: usize,
}

impl AnnotatedBatch {
    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        batch_summary(&self.comments, &self.topics, self.skipped_records)
    }
}

pub struct Pipeline {
    providers: ProviderSet,
    options: PipelineOptions,
}

impl Pipeline {
    #[must_use]
    pub fn new(providers: ProviderSet, options: PipelineOptions) -> Self {
        Self { providers, options }
    }

    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Load, annotate and score one raw batch.
    ///
    /// Stages run strictly in order over the whole batch. Any stage failure
    /// aborts the batch and no rows are returned.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for an unusable payload, and
    /// [`EngineError::ProviderFailure`] or [`EngineError::StageShape`] naming
    /// the failed stage.
    pub async fn process_batch(&self, input: &Value) -> Result<AnnotatedBatch, EngineError> {
        let started = Instant::now();
        let loaded = load_comments(input)?;

        if loaded.records.is_empty() {
            tracing::info!(
                skipped = loaded.skipped,
                "batch has no retained comments; skipping providers"
            );
            return Ok(AnnotatedBatch {
                skipped_records: loaded.skipped,
                ..AnnotatedBatch::default()
            });
        }

        let texts: Vec<String> = loaded.records.iter().map(|r| r.text.clone()).collect();
        let mut table = TableBuilder::new(loaded.records);

        let sentiment = run_stage(
            Stage::Sentiment,
            texts.len(),
            self.providers.sentiment.predict(&texts),
        )
        .await?;
        table.attach_sentiment(sentiment)?;

        let polarity = run_stage(
            Stage::Lexicon,
            texts.len(),
            self.providers.polarity.analyze(&texts),
        )
        .await?;
        table.attach_polarity(polarity)?;

        let emotions = run_stage(
            Stage::Emotion,
            texts.len(),
            self.providers.emotion.predict(&texts, self.options.emotion_top_k),
        )
        .await?;
        table.attach_emotion(
            emotions
                .into_iter()
                .map(|p| threshold_emotions(p, &self.options))
                .collect(),
        )?;

        let entities = run_stage(
            Stage::Entities,
            texts.len(),
            self.providers.entities.extract(&texts),
        )
        .await?;
        table.attach_entities(entities)?;

        let assignment = run_stage(
            Stage::Topics,
            texts.len(),
            self.providers.topics.fit_transform(&texts),
        )
        .await?;
        if assignment.probabilities.len() != assignment.topic_ids.len() {
            return Err(EngineError::StageShape {
                stage: Stage::Topics,
                expected: assignment.topic_ids.len(),
                got: assignment.probabilities.len(),
            });
        }
        table.attach_topics(
            assignment
                .topic_ids
                .iter()
                .zip(&assignment.probabilities)
                .map(|(&topic_id, &probability)| TopicMembership {
                    topic_id,
                    probability,
                })
                .collect(),
        )?;

        let comments = table.finish(&self.options.scoring)?;

        tracing::info!(
            comments = comments.len(),
            skipped = loaded.skipped,
            topics = assignment.summary.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "batch annotated"
        );

        Ok(AnnotatedBatch {
            comments,
            topics: assignment.summary,
            skipped_records: loaded.skipped,
        })
    }
}

/// Keep at most `top_k` labels scoring at or above the threshold.
fn threshold_emotions(prediction: EmotionPrediction, options: &PipelineOptions) -> EmotionAnnotation {
    let emotions: Vec<_> = prediction
        .top_emotions
        .into_iter()
        .filter(|e| e.score >= options.emotion_threshold)
        .take(options.emotion_top_k)
        .collect();
    let primary = emotions
        .first()
        .map_or_else(|| FALLBACK_EMOTION.to_string(), |e| e.label.clone());
    EmotionAnnotation { primary, emotions }
}

async fn run_stage<T, F>(stage: Stage, texts: usize, call: F) -> Result<T, EngineError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    let started = Instant::now();
    tracing::info!(stage = %stage, texts, "stage started");

    match call.await {
        Ok(output) => {
            tracing::info!(
                stage = %stage,
                elapsed_ms = started.elapsed().as_millis(),
                "stage complete"
            );
            Ok(output)
        }
        Err(source) => {
            tracing::error!(stage = %stage, error = %source, "stage failed");
            Err(EngineError::ProviderFailure { stage, source })
        }
    }
}

#[cfg(test)]
mod tests {
    use terrace_core::EmotionScore;

    use super::*;

    fn prediction(scores: &[(&str, f64)]) -> EmotionPrediction {
        EmotionPrediction {
            top_emotions: scores
                .iter()
                .map(|(label, score)| EmotionScore {
                    label: (*label).to_string(),
                    score: *score,
                })
                .collect(),
            primary_label: scores.first().map_or("neutral", |s| s.0).to_string(),
            all_scores: std::collections::BTreeMap::new(),
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let annotation = threshold_emotions(
            prediction(&[("joy", 0.6), ("pride", 0.3), ("relief", 0.29)]),
            &PipelineOptions::default(),
        );
        let labels: Vec<&str> = annotation.emotions.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["joy", "pride"]);
        assert_eq!(annotation.primary, "joy");
    }

    #[test]
    fn nothing_above_threshold_is_neutral() {
        let annotation = threshold_emotions(
            prediction(&[("anger", 0.2), ("annoyance", 0.1)]),
            &PipelineOptions::default(),
        );
        assert!(annotation.emotions.is_empty());
        assert_eq!(annotation.primary, FALLBACK_EMOTION);
    }

    #[test]
    fn top_k_bounds_kept_labels() {
        let options = PipelineOptions {
            emotion_top_k: 1,
            ..PipelineOptions::default()
        };
        let annotation = threshold_emotions(prediction(&[("joy", 0.9), ("love", 0.8)]), &options);
        assert_eq!(annotation.emotions.len(), 1);
    }

    #[test]
    fn stage_names_are_lowercase() {
        assert_eq!(Stage::Lexicon.to_string(), "lexicon");
        assert_eq!(
            serde_json::to_string(&Stage::Entities).unwrap(),
            "\"entities\""
        );
    }
}

//! Column-wise assembly of annotated comments.
//!
//! Every stage attaches one column with exactly one entry per comment. Rows
//! are only materialized by [`TableBuilder::finish`] once every column is
//! present, so a failed batch never yields a partially annotated row.

use terrace_core::{
    AnnotatedComment, CommentRecord, EmotionScore, EntityMentions, OpinionStrength,
};
use terrace_providers::{PolarityScores, SentimentPrediction};

use crate::error::EngineError;
use crate::pipeline::Stage;
use crate::scoring::{opinion_scores, ScoreColumns, ScoringPolicy};

/// Thresholded emotion output for one comment.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionAnnotation {
    pub primary: String,
    pub emotions: Vec<EmotionScore>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopicMembership {
    pub topic_id: i32,
    pub probability: f64,
}

pub struct TableBuilder {
    records: Vec<CommentRecord>,
    sentiment: Option<Vec<SentimentPrediction>>,
    polarity: Option<Vec<PolarityScores>>,
    emotion: Option<Vec<EmotionAnnotation>>,
    entities: Option<Vec<EntityMentions>>,
    topics: Option<Vec<TopicMembership>>,
}

impl TableBuilder {
    #[must_use]
    pub fn new(records: Vec<CommentRecord>) -> Self {
        Self {
            records,
            sentiment: None,
            polarity: None,
            emotion: None,
            entities: None,
            topics: None,
        }
    }

    /// # Errors
    ///
    /// [`EngineError::StageShape`] on a length mismatch,
    /// [`EngineError::ColumnConflict`] if already attached.
    pub fn attach_sentiment(&mut self, column: Vec<SentimentPrediction>) -> Result<(), EngineError> {
        attach(&mut self.sentiment, Stage::Sentiment, self.records.len(), column)
    }

    /// # Errors
    ///
    /// See [`TableBuilder::attach_sentiment`].
    pub fn attach_polarity(&mut self, column: Vec<PolarityScores>) -> Result<(), EngineError> {
        attach(&mut self.polarity, Stage::Lexicon, self.records.len(), column)
    }

    /// # Errors
    ///
    /// See [`TableBuilder::attach_sentiment`].
    pub fn attach_emotion(&mut self, column: Vec<EmotionAnnotation>) -> Result<(), EngineError> {
        attach(&mut self.emotion, Stage::Emotion, self.records.len(), column)
    }

    /// # Errors
    ///
    /// See [`TableBuilder::attach_sentiment`].
    pub fn attach_entities(&mut self, column: Vec<EntityMentions>) -> Result<(), EngineError> {
        attach(&mut self.entities, Stage::Entities, self.records.len(), column)
    }

    /// # Errors
    ///
    /// See [`TableBuilder::attach_sentiment`].
    pub fn attach_topics(&mut self, column: Vec<TopicMembership>) -> Result<(), EngineError> {
        attach(&mut self.topics, Stage::Topics, self.records.len(), column)
    }

    /// Compute opinion scores and materialize the rows.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::IncompleteBatch`] if a non-empty table is
    /// missing any column.
    pub fn finish(self, policy: &ScoringPolicy) -> Result<Vec<AnnotatedComment>, EngineError> {
        if self.records.is_empty() {
            return Ok(Vec::new());
        }

        let sentiment = required(self.sentiment, Stage::Sentiment)?;
        let polarity = required(self.polarity, Stage::Lexicon)?;
        let emotion = required(self.emotion, Stage::Emotion)?;
        let entities = required(self.entities, Stage::Entities)?;
        let topics = required(self.topics, Stage::Topics)?;

        let compound: Vec<f64> = polarity.iter().map(|p| p.compound).collect();
        let confidence: Vec<f64> = sentiment.iter().map(|s| s.confidence).collect();
        let engagement: Vec<i64> = self.records.iter().map(|r| r.engagement_score).collect();
        let intensity: Vec<f64> = polarity.iter().map(|p| p.intensity).collect();
        let scores = opinion_scores(
            policy,
            &ScoreColumns {
                compound: &compound,
                confidence: &confidence,
                engagement: &engagement,
                intensity: &intensity,
            },
        );

        let rows = self
            .records
            .into_iter()
            .zip(sentiment)
            .zip(polarity)
            .zip(emotion)
            .zip(entities)
            .zip(topics)
            .zip(scores)
            .map(
                |((((((record, sentiment), polarity), emotion), entities), topic), opinion_score)| {
                    AnnotatedComment {
                        record,
                        sentiment_a: sentiment.label,
                        sentiment_a_confidence: sentiment.confidence,
                        sentiment_a_scores: sentiment.scores,
                        sentiment_b_label: polarity.label,
                        sentiment_b_compound: polarity.compound,
                        sentiment_b_positive: polarity.positive,
                        sentiment_b_neutral: polarity.neutral,
                        sentiment_b_negative: polarity.negative,
                        opinion_intensity: polarity.intensity,
                        opinion_strength: OpinionStrength::from_intensity(polarity.intensity),
                        primary_emotion: emotion.primary,
                        emotions: emotion.emotions,
                        entities,
                        topic_id: topic.topic_id,
                        topic_probability: topic.probability,
                        opinion_score,
                    }
                },
            )
            .collect();

        Ok(rows)
    }
}

fn attach<T>(
    slot: &mut Option<Vec<T>>,
    stage: Stage,
    expected: usize,
    column: Vec<T>,
) -> Result<(), EngineError> {
    if slot.is_some() {
        return Err(EngineError::ColumnConflict { stage });
    }
    if column.len() != expected {
        return Err(EngineError::StageShape {
            stage,
            expected,
            got: column.len(),
        });
    }
    *slot = Some(column);
    Ok(())
}

fn required<T>(column: Option<Vec<T>>, stage: Stage) -> Result<Vec<T>, EngineError> {
    column.ok_or(EngineError::IncompleteBatch { stage })
}

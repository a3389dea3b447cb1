//! Fine-grained emotion classifier served over a TEI-style `/predict` endpoint.

use std::collections::BTreeMap;

use async_trait::async_trait;
use terrace_core::EmotionScore;

use crate::error::ProviderError;
use crate::inference::{HttpOptions, InferenceClient};
use crate::sentiment::{LabelScore, PredictRequest};
use crate::types::EmotionPrediction;
use crate::EmotionClassifier;

const PROVIDER: &str = "emotion";

/// The 28-label emotion taxonomy, in canonical order.
pub const EMOTIONS: [&str; 28] = [
    "admiration",
    "amusement",
    "anger",
    "annoyance",
    "approval",
    "caring",
    "confusion",
    "curiosity",
    "desire",
    "disappointment",
    "disapproval",
    "disgust",
    "embarrassment",
    "excitement",
    "fear",
    "gratitude",
    "grief",
    "joy",
    "love",
    "nervousness",
    "optimism",
    "pride",
    "realization",
    "relief",
    "remorse",
    "sadness",
    "surprise",
    "neutral",
];

pub struct HttpEmotionClassifier {
    client: InferenceClient,
}

impl HttpEmotionClassifier {
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, options: HttpOptions) -> Result<Self, ProviderError> {
        Ok(Self {
            client: InferenceClient::new(PROVIDER, base_url, options)?,
        })
    }
}

#[async_trait]
impl EmotionClassifier for HttpEmotionClassifier {
    async fn predict(
        &self,
        texts: &[String],
        top_k: usize,
    ) -> Result<Vec<EmotionPrediction>, ProviderError> {
        let raw: Vec<Vec<LabelScore>> = self
            .client
            .post_batched("predict", texts, |inputs| PredictRequest {
                inputs,
                truncate: true,
            })
            .await?;

        raw.into_iter()
            .map(|scores| to_prediction(scores, top_k))
            .collect()
    }
}

fn taxonomy_index(label: &str) -> Option<usize> {
    EMOTIONS.iter().position(|e| *e == label)
}

fn to_prediction(scores: Vec<LabelScore>, top_k: usize) -> Result<EmotionPrediction, ProviderError> {
    let mut ranked = Vec::with_capacity(scores.len());
    for entry in scores {
        let label = entry.label.trim().to_ascii_lowercase();
        let idx = taxonomy_index(&label).ok_or_else(|| ProviderError::Response {
            provider: PROVIDER,
            reason: format!("unknown emotion label '{}'", entry.label),
        })?;
        ranked.push((idx, label, entry.score));
    }

    ranked.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));

    let all_scores: BTreeMap<String, f64> = ranked
        .iter()
        .map(|(_, label, score)| (label.clone(), *score))
        .collect();

    let top_emotions: Vec<EmotionScore> = ranked
        .into_iter()
        .take(top_k)
        .map(|(_, label, score)| EmotionScore { label, score })
        .collect();

    let primary_label = top_emotions
        .first()
        .map_or_else(|| "neutral".to_string(), |e| e.label.clone());

    Ok(EmotionPrediction {
        top_emotions,
        primary_label,
        all_scores,
    })
}

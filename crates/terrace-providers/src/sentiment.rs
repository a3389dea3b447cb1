//! Transformer sentiment classifier served over a TEI-style `/predict` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use terrace_core::SentimentLabel;

use crate::error::ProviderError;
use crate::inference::{HttpOptions, InferenceClient};
use crate::types::SentimentPrediction;
use crate::SentimentClassifier;

const PROVIDER: &str = "sentiment";

#[derive(Serialize)]
pub(crate) struct PredictRequest<'a> {
    pub(crate) inputs: &'a [String],
    pub(crate) truncate: bool,
}

/// One `{label, score}` pair from a `/predict` response.
#[derive(Debug, Deserialize)]
pub(crate) struct LabelScore {
    pub(crate) label: String,
    pub(crate) score: f64,
}

pub struct HttpSentimentClassifier {
    client: InferenceClient,
}

impl HttpSentimentClassifier {
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
impl SentimentClassifier for HttpSentimentClassifier {
    async fn predict(&self, texts: &[String]) -> Result<Vec<SentimentPrediction>, ProviderError> {
        let raw: Vec<Vec<LabelScore>> = self
            .client
            .post_batched("predict", texts, |inputs| PredictRequest {
                inputs,
                truncate: true,
            })
            .await?;

        raw.iter()
            .map(|scores| to_prediction(self.client.provider(), scores))
            .collect()
    }
}

/// Map a model label to a sentiment class.
///
/// Accepts plain class names and the positional `LABEL_n` names used by
/// fine-tuned three-class heads (0 = negative, 1 = neutral, 2 = positive).
fn parse_model_label(label: &str) -> Option<SentimentLabel> {
    match label.trim().to_ascii_lowercase().as_str() {
        "negative" | "neg" | "label_0" => Some(SentimentLabel::Negative),
        "neutral" | "neu" | "label_1" => Some(SentimentLabel::Neutral),
        "positive" | "pos" | "label_2" => Some(SentimentLabel::Positive),
        _ => None,
    }
}

fn to_prediction(
    provider: &'static str,
    scores: &[LabelScore],
) -> Result<SentimentPrediction, ProviderError> {
    let mut class_scores = [0.0_f64; 3];
    let mut seen = [false; 3];

    for entry in scores {
        let label = parse_model_label(&entry.label).ok_or_else(|| ProviderError::Response {
            provider,
            reason: format!("unknown sentiment label '{}'", entry.label),
        })?;
        let idx = class_index(label);
        class_scores[idx] = entry.score;
        seen[idx] = true;
    }

    if seen.iter().any(|s| !s) {
        return Err(ProviderError::Response {
            provider,
            reason: format!("expected scores for all 3 classes, got {}", scores.len()),
        });
    }

    // Argmax; on an exact tie the earlier class in negative/neutral/positive wins.
    let mut best = 0;
    for idx in 1..3 {
        if class_scores[idx] > class_scores[best] {
            best = idx;
        }
    }

    Ok(SentimentPrediction {
        label: SentimentLabel::ALL[best],
        confidence: class_scores[best],
        scores: class_scores,
    })
}

fn class_index(label: SentimentLabel) -> usize {
    match label {
        SentimentLabel::Negative => 0,
        SentimentLabel::Neutral => 1,
        SentimentLabel::Positive => 2,
    }
}

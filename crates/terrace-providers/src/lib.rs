//! Signal providers for the annotation pipeline.
//!
//! Each provider is a trait so the engine can run against remote inference
//! services in production and deterministic stubs in tests. Every call is
//! order preserving and returns exactly one result per input text.

pub mod embeddings;
pub mod emotion;
pub mod entities;
pub mod error;
mod inference;
pub mod lexicon;
pub mod sentiment;
pub mod topics;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use terrace_core::{AppConfig, EntityMentions};

pub use embeddings::TeiClient;
pub use emotion::{HttpEmotionClassifier, EMOTIONS};
pub use entities::HttpEntityExtractor;
pub use error::ProviderError;
pub use inference::HttpOptions;
pub use lexicon::LexiconAnalyzer;
pub use sentiment::HttpSentimentClassifier;
pub use topics::{cluster_topics, EmbeddingTopicModel, TopicOptions, OUTLIER_TOPIC};
pub use types::{EmotionPrediction, PolarityScores, SentimentPrediction, TopicAssignment};

/// Three-class sentiment model.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn predict(&self, texts: &[String]) -> Result<Vec<SentimentPrediction>, ProviderError>;
}

/// Lexicon polarity scorer.
#[async_trait]
pub trait PolarityAnalyzer: Send + Sync {
    async fn analyze(&self, texts: &[String]) -> Result<Vec<PolarityScores>, ProviderError>;
}

/// Multi-label emotion model over [`EMOTIONS`].
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// `top_k` bounds the length of each prediction's `top_emotions`.
    async fn predict(
        &self,
        texts: &[String],
        top_k: usize,
    ) -> Result<Vec<EmotionPrediction>, ProviderError>;
}

#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract(&self, texts: &[String]) -> Result<Vec<EntityMentions>, ProviderError>;
}

/// Batch topic discovery. Ids are stable within one call only.
#[async_trait]
pub trait TopicModel: Send + Sync {
    async fn fit_transform(&self, texts: &[String]) -> Result<TopicAssignment, ProviderError>;
}

/// Every provider the pipeline needs, behind trait objects.
#[derive(Clone)]
pub struct ProviderSet {
    pub sentiment: Arc<dyn SentimentClassifier>,
    pub polarity: Arc<dyn PolarityAnalyzer>,
    pub emotion: Arc<dyn EmotionClassifier>,
    pub entities: Arc<dyn EntityExtractor>,
    pub topics: Arc<dyn TopicModel>,
}

impl ProviderSet {
    /// Build the production providers from application config.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] if an HTTP client cannot be built,
    /// or [`ProviderError::Lexicon`] if the custom lexicon cannot be loaded.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let options = HttpOptions {
            batch_size: config.provider_batch_size,
            concurrency: config.provider_concurrency,
            timeout: Duration::from_secs(config.provider_timeout_secs),
        };

        let polarity = match &config.lexicon_path {
            Some(path) => {
                let lexicon = terrace_core::load_lexicon(path)?;
                tracing::info!(
                    path = %path.display(),
                    terms = lexicon.terms.len(),
                    "loaded custom lexicon"
                );
                LexiconAnalyzer::with_custom_lexicon(&lexicon.terms)
            }
            None => LexiconAnalyzer::new(),
        }
        .with_cutoff(config.polarity_cutoff);

        let topic_options = TopicOptions {
            n_topics: config.topic_count,
            min_topic_size: config.min_topic_size,
        };

        Ok(Self {
            sentiment: Arc::new(HttpSentimentClassifier::new(
                &config.sentiment_url,
                options.clone(),
            )?),
            polarity: Arc::new(polarity),
            emotion: Arc::new(HttpEmotionClassifier::new(
                &config.emotion_url,
                options.clone(),
            )?),
            entities: Arc::new(HttpEntityExtractor::new(&config.ner_url, options.clone())?),
            topics: Arc::new(EmbeddingTopicModel::new(
                TeiClient::new(&config.tei_url, options)?,
                topic_options,
            )),
        })
    }
}

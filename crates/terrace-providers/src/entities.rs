//! Named-entity extraction over HTTP.
//!
//! The service accepts `{"texts": [...]}` on `POST /extract` and answers with
//! one `{"entities": [{"text", "label"}]}` object per input text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use terrace_core::{EntityMention, EntityMentions};

use crate::error::ProviderError;
use crate::inference::{HttpOptions, InferenceClient};
use crate::EntityExtractor;

const PROVIDER: &str = "entities";

#[derive(Serialize)]
struct ExtractRequest<'a> {
    texts: &'a [String],
}

#[derive(Deserialize)]
struct ExtractResult {
    #[serde(default)]
    entities: Vec<EntityMention>,
}

pub struct HttpEntityExtractor {
    client: InferenceClient,
}

impl HttpEntityExtractor {
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
impl EntityExtractor for HttpEntityExtractor {
    async fn extract(&self, texts: &[String]) -> Result<Vec<EntityMentions>, ProviderError> {
        let raw: Vec<ExtractResult> = self
            .client
            .post_batched("extract", texts, |texts| ExtractRequest { texts })
            .await?;

        Ok(raw
            .into_iter()
            .map(|r| EntityMentions::from_mentions(r.entities))
            .collect())
    }
}

//! TEI embeddings client.

use serde::Serialize;

use crate::error::ProviderError;
use crate::inference::{HttpOptions, InferenceClient};

const PROVIDER: &str = "embeddings";

/// TEI embedding request body.
#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

/// Client for a TEI `/embed` endpoint.
pub struct TeiClient {
    client: InferenceClient,
}

impl TeiClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, options: HttpOptions) -> Result<Self, ProviderError> {
        Ok(Self {
            client: InferenceClient::new(PROVIDER, base_url, options)?,
        })
    }

    /// Embed every text, returning one vector per input in input order.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failures, non-success status,
    /// or when TEI returns a different number of vectors than inputs.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .post_batched("embed", texts, |inputs| EmbedRequest { inputs })
            .await
    }
}

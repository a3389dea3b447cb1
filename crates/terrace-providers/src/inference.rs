//! Shared HTTP plumbing for remote inference services.

use std::time::Duration;

use futures::future::BoxFuture;
use futures::{StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProviderError;

/// Tuning shared by every remote provider.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Maximum number of texts per request.
    pub batch_size: usize,
    /// Maximum number of requests in flight for one call.
    pub concurrency: usize,
    pub timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            concurrency: 4,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Batched JSON client for one inference service.
pub(crate) struct InferenceClient {
    provider: &'static str,
    client: reqwest::Client,
    base_url: String,
    options: HttpOptions,
}

impl InferenceClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] for a zero batch size or concurrency,
    /// or if the HTTP client cannot be built.
    pub(crate) fn new(
        provider: &'static str,
        base_url: &str,
        options: HttpOptions,
    ) -> Result<Self, ProviderError> {
        if options.batch_size == 0 || options.concurrency == 0 {
            return Err(ProviderError::Config(format!(
                "{provider}: batch size and concurrency must be greater than zero"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| ProviderError::Config(format!("{provider}: HTTP client: {e}")))?;

        Ok(Self {
            provider,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            options,
        })
    }

    pub(crate) fn provider(&self) -> &'static str {
        self.provider
    }

    /// POST `texts` to `path` in chunks of `batch_size`.
    ///
    /// Up to `concurrency` chunks are in flight at once; results come back in
    /// input order with exactly one item per text.
    pub(crate) async fn post_batched<'t, B, R, F>(
        &self,
        path: &str,
        texts: &'t [String],
        make_body: F,
    ) -> Result<Vec<R>, ProviderError>
    where
        B: Serialize + Send,
        R: DeserializeOwned + Send,
        F: Fn(&'t [String]) -> B + Sync,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let pending: Vec<BoxFuture<'_, Result<Vec<R>, ProviderError>>> = texts
            .chunks(self.options.batch_size)
            .map(|chunk| {
                Box::pin(self.post_chunk(&url, chunk.len(), make_body(chunk)))
                    as BoxFuture<'_, Result<Vec<R>, ProviderError>>
            })
            .collect();

        let chunks: Vec<Vec<R>> = futures::stream::iter(pending)
            .buffered(self.options.concurrency)
            .try_collect()
            .await?;

        Ok(chunks.into_iter().flatten().collect())
    }

    async fn post_chunk<B, R>(
        &self,
        url: &str,
        expected: usize,
        body: B,
    ) -> Result<Vec<R>, ProviderError>
    where
        B: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let response = self.client.post(url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::UnexpectedStatus {
                provider: self.provider,
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let items: Vec<R> = response.json().await.map_err(|e| ProviderError::Response {
            provider: self.provider,
            reason: format!("parse error: {e}"),
        })?;

        if items.len() != expected {
            return Err(ProviderError::ShapeMismatch {
                provider: self.provider,
                expected,
                got: items.len(),
            });
        }

        tracing::debug!(provider = self.provider, count = items.len(), "inference chunk complete");
        Ok(items)
    }
}

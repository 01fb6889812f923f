//! Remote embedding provider using the OpenAI embeddings API.
//!
//! An alternative to the local `fastembed` provider for callers that
//! prefer hosted models. Only available with the `openai` feature.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{PaperdexError, Result};

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
const DEFAULT_DIMENSIONS: usize = 1536;

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// Batches are sent as a single API call. The model name defaults to
/// `text-embedding-3-small` (1536 dimensions).
///
/// # Example
///
/// ```rust,ignore
/// use paperdex_core::openai::OpenAIEmbeddingProvider;
///
/// let provider = OpenAIEmbeddingProvider::from_env()?
///     .with_model("text-embedding-3-large", 3072);
/// ```
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbeddingProvider {
    /// Create a provider with the given API key and the default model.
    ///
    /// # Errors
    ///
    /// Returns [`PaperdexError::EmbeddingError`] if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(embedding_error("API key must not be empty"));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a provider from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| embedding_error("OPENAI_API_KEY environment variable not set"))?;
        Self::new(api_key)
    }

    /// Use a different model with the given output dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }
}

fn embedding_error(message: impl Into<String>) -> PaperdexError {
    PaperdexError::EmbeddingError { provider: "OpenAI".to_string(), message: message.into() }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct ApiResponse {
    data: Vec<ApiEmbedding>,
}

#[derive(Deserialize)]
struct ApiEmbedding {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| embedding_error("API returned empty response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(batch_size = texts.len(), model = %self.model, "embedding batch via OpenAI");

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&ApiRequest { model: &self.model, input: texts })
            .send()
            .await
            .map_err(|e| embedding_error(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, "OpenAI API error");
            return Err(embedding_error(format!("API returned {status}: {body}")));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| embedding_error(format!("failed to parse response: {e}")))?;
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        assert!(OpenAIEmbeddingProvider::new("").is_err());
    }

    #[test]
    fn with_model_updates_dimensions() {
        let provider = OpenAIEmbeddingProvider::new("sk-test")
            .unwrap()
            .with_model("text-embedding-3-large", 3072);
        assert_eq!(provider.dimensions(), 3072);
        assert_eq!(provider.model_name(), "text-embedding-3-large");
    }
}

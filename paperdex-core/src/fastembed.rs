//! Local embedding provider backed by the `fastembed` crate.
//!
//! Runs a sentence-embedding model in-process, with no API calls. The
//! first construction for a given model downloads and loads the model
//! once; the instance is then reused for every call for the life of the
//! process. Only available with the `local-embeddings` feature.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::Mutex;
use tracing::info;

use crate::embedding::EmbeddingProvider;
use crate::error::{PaperdexError, Result};

/// An [`EmbeddingProvider`] running a local sentence-embedding model.
///
/// The model handle lives behind an `Arc<Mutex<..>>` because `fastembed`
/// embedding takes `&mut self`; one model invocation runs at a time, which
/// matches the pipeline's request-at-a-time model.
#[derive(Clone)]
pub struct LocalEmbeddingProvider {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimensions: usize,
}

/// Map a configured model identifier to a `fastembed` model and its
/// dimensionality.
fn resolve_model(model_name: &str) -> Result<(EmbeddingModel, usize)> {
    match model_name {
        "paraphrase-multilingual-MiniLM-L12-v2" => {
            Ok((EmbeddingModel::ParaphraseMLMiniLML12V2, 384))
        }
        "paraphrase-multilingual-mpnet-base-v2" => {
            Ok((EmbeddingModel::ParaphraseMLMpnetBaseV2, 768))
        }
        "all-MiniLM-L6-v2" => Ok((EmbeddingModel::AllMiniLML6V2, 384)),
        "BAAI/bge-small-en-v1.5" => Ok((EmbeddingModel::BGESmallENV15, 384)),
        "BAAI/bge-base-en-v1.5" => Ok((EmbeddingModel::BGEBaseENV15, 768)),
        "nomic-embed-text-v1.5" => Ok((EmbeddingModel::NomicEmbedTextV15, 768)),
        other => Err(PaperdexError::ConfigError(format!(
            "unknown embedding model '{other}'"
        ))),
    }
}

impl LocalEmbeddingProvider {
    /// Load the model named by `model_name`, optionally caching model files
    /// under `cache_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PaperdexError::ConfigError`] for an unknown model name or
    /// [`PaperdexError::EmbeddingError`] if the model fails to load.
    pub fn new(model_name: &str, cache_dir: Option<PathBuf>) -> Result<Self> {
        let (model_type, dimensions) = resolve_model(model_name)?;

        info!(model = model_name, "loading embedding model");
        let mut init_options = InitOptions::new(model_type);
        if let Some(dir) = cache_dir {
            init_options = init_options.with_cache_dir(dir);
        }
        let model = TextEmbedding::try_new(init_options).map_err(|e| {
            PaperdexError::EmbeddingError {
                provider: "fastembed".to_string(),
                message: format!("failed to initialize model '{model_name}': {e}"),
            }
        })?;
        info!(model = model_name, dimensions, "embedding model loaded");

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            model_name: model_name.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut batch = self.embed_batch(&[text]).await?;
        batch.pop().ok_or_else(|| PaperdexError::EmbeddingError {
            provider: "fastembed".to_string(),
            message: "model returned no embedding".to_string(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let mut model = self.model.lock().await;
        model.embed(owned, None).map_err(|e| PaperdexError::EmbeddingError {
            provider: "fastembed".to_string(),
            message: e.to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_models() {
        let (_, dims) = resolve_model("paraphrase-multilingual-MiniLM-L12-v2").unwrap();
        assert_eq!(dims, 384);
        let (_, dims) = resolve_model("BAAI/bge-base-en-v1.5").unwrap();
        assert_eq!(dims, 768);
    }

    #[test]
    fn rejects_unknown_model() {
        assert!(matches!(
            resolve_model("made-up-model"),
            Err(PaperdexError::ConfigError(_))
        ));
    }
}

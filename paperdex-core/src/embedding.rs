//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends (a local sentence
/// embedding model, a remote API, etc.) behind a unified async interface.
/// A fixed model pins embedding dimensionality and semantics; mixing
/// vectors from two different models in one index is a caller error the
/// system does not detect.
///
/// The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends that support native batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use paperdex_core::EmbeddingProvider;
///
/// let provider = MyEmbeddingProvider::new();
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// Returns one vector per input, preserving order. An empty batch
    /// yields an empty vector.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Return the model identifier this provider embeds with.
    fn model_name(&self) -> &str;
}

/// A deterministic, offline embedding provider for tests and demos.
///
/// Hashes the text bytes and derives a normalized vector whose direction
/// depends on the content. Identical texts always embed identically, so
/// self-similarity searches behave like a real model without any model
/// download or API key. Not semantically meaningful.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    /// Create a provider emitting vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut embedding = vec![0.0f32; self.dimensions];
        for (i, value) in embedding.iter_mut().enumerate() {
            *value = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        // L2-normalize so cosine similarity is just the dot product.
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        "hash-embedding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_embeddings_are_deterministic_and_normalized() {
        let provider = HashEmbeddingProvider::new(32);
        let a = provider.embed("retrieval augmented generation").await.unwrap();
        let b = provider.embed("retrieval augmented generation").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);

        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn different_texts_embed_differently() {
        let provider = HashEmbeddingProvider::default();
        let a = provider.embed("alpha").await.unwrap();
        let b = provider.embed("beta").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn empty_batch_yields_empty_output() {
        let provider = HashEmbeddingProvider::default();
        let out = provider.embed_batch(&[]).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let provider = HashEmbeddingProvider::default();
        let batch = provider.embed_batch(&["one", "two", "three"]).await.unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0], provider.embed("one").await.unwrap());
        assert_eq!(batch[2], provider.embed("three").await.unwrap());
    }
}

//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{PaperdexError, Result};

/// The default embedding model identifier (multilingual sentence embeddings).
pub const DEFAULT_MODEL_NAME: &str = "paraphrase-multilingual-MiniLM-L12-v2";

/// Configuration parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaperdexConfig {
    /// Name of the vector index collection.
    pub collection_name: String,
    /// Directory where the persistent index stores its data.
    pub persist_directory: String,
    /// Embedding model identifier. Pins dimensionality and semantics;
    /// all vectors in one collection must come from the same model.
    pub model_name: String,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of results returned when the caller does not specify one.
    pub default_top_k: usize,
    /// Upper bound on the number of results a single search may request.
    pub max_top_k: usize,
}

impl Default for PaperdexConfig {
    fn default() -> Self {
        Self {
            collection_name: "papers".to_string(),
            persist_directory: "./chroma_db".to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            chunk_size: 512,
            chunk_overlap: 50,
            default_top_k: 5,
            max_top_k: 20,
        }
    }
}

impl PaperdexConfig {
    /// Create a new builder for constructing a [`PaperdexConfig`].
    pub fn builder() -> PaperdexConfigBuilder {
        PaperdexConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`PaperdexConfig`].
#[derive(Debug, Clone, Default)]
pub struct PaperdexConfigBuilder {
    config: PaperdexConfig,
}

impl PaperdexConfigBuilder {
    /// Set the collection name.
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.config.collection_name = name.into();
        self
    }

    /// Set the persistence directory.
    pub fn persist_directory(mut self, dir: impl Into<String>) -> Self {
        self.config.persist_directory = dir.into();
        self
    }

    /// Set the embedding model identifier.
    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.config.model_name = name.into();
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the default number of search results.
    pub fn default_top_k(mut self, k: usize) -> Self {
        self.config.default_top_k = k;
        self
    }

    /// Set the maximum number of search results.
    pub fn max_top_k(mut self, k: usize) -> Self {
        self.config.max_top_k = k;
        self
    }

    /// Build the [`PaperdexConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`PaperdexError::ConfigError`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `default_top_k == 0` or `default_top_k > max_top_k`
    pub fn build(self) -> Result<PaperdexConfig> {
        if self.config.chunk_size == 0 {
            return Err(PaperdexError::ConfigError(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(PaperdexError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.default_top_k == 0 {
            return Err(PaperdexError::ConfigError(
                "default_top_k must be greater than zero".to_string(),
            ));
        }
        if self.config.default_top_k > self.config.max_top_k {
            return Err(PaperdexError::ConfigError(format!(
                "default_top_k ({}) must not exceed max_top_k ({})",
                self.config.default_top_k, self.config.max_top_k
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PaperdexConfig::builder().build().unwrap();
        assert_eq!(config, PaperdexConfig::default());
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let err = PaperdexConfig::builder().chunk_size(0).build().unwrap_err();
        assert!(matches!(err, PaperdexError::ConfigError(_)));
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let err = PaperdexConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, PaperdexError::ConfigError(_)));
    }

    #[test]
    fn rejects_default_top_k_above_max() {
        let err = PaperdexConfig::builder().default_top_k(50).max_top_k(10).build().unwrap_err();
        assert!(matches!(err, PaperdexError::ConfigError(_)));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = PaperdexConfig::builder().chunk_size(256).chunk_overlap(32).build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: PaperdexConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}

//! Error types for the `paperdex-core` crate.

use thiserror::Error;

/// Errors that can occur in the retrieval pipeline.
///
/// Soft outcomes are deliberately not represented here: a document that
/// yields no text and an empty input batch are reported through return
/// values (and a warning log), not raised as errors, so batch flows can
/// keep going.
#[derive(Debug, Error)]
pub enum PaperdexError {
    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A source document could not be read or parsed.
    #[error("Extraction error ({path}): {message}")]
    ExtractionError {
        /// The path of the document that failed.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index backend.
    #[error("Index error ({backend}): {message}")]
    IndexError {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// An I/O error from the persistent index.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A serialization error from the persistent index snapshot.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, PaperdexError>;

//! Local document-retrieval pipeline: PDF text → overlapping chunks →
//! sentence embeddings → persistent cosine-similarity index → filtered
//! nearest-neighbor search.
//!
//! The pieces compose bottom-up:
//!
//! - [`TextChunker`] splits extracted text into bounded, overlapping
//!   segments, optionally snapping to sentence boundaries
//! - [`EmbeddingProvider`] turns text into vectors (local model via the
//!   `local-embeddings` feature, OpenAI via the `openai` feature, or the
//!   deterministic [`HashEmbeddingProvider`] for offline use)
//! - [`VectorIndex`] stores `(vector, text, metadata)` records and answers
//!   cosine-similarity queries with exact-match metadata filters;
//!   [`MemoryIndex`] is ephemeral, [`PersistentIndex`] survives restarts
//! - [`PaperManager`] orchestrates extraction, chunking, and indexing into
//!   one add / search / delete / stats / reset API
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use paperdex_core::{
//!     DocumentSource, HashEmbeddingProvider, PaperManager, PaperdexConfig, PersistentIndex,
//! };
//!
//! let config = PaperdexConfig::default();
//! let provider = Arc::new(HashEmbeddingProvider::default());
//! let index = Arc::new(PersistentIndex::open(
//!     &config.persist_directory,
//!     &config.collection_name,
//!     provider,
//! )?);
//! let manager = PaperManager::builder().config(config).index(index).build()?;
//!
//! manager.add_document(DocumentSource::Path("paper.pdf".into()), None).await?;
//! let hits = manager.search("contrastive pretraining", None, None).await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod index;
pub mod inmemory;
pub mod manager;
pub mod persistent;

#[cfg(feature = "local-embeddings")]
pub mod fastembed;

#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{ChunkInfo, TextChunker};
pub use config::{PaperdexConfig, PaperdexConfigBuilder, DEFAULT_MODEL_NAME};
pub use document::{
    ChunkMetadata, ChunkRecord, DocumentMetadata, MetadataFilter, Paper, PaperHit, ScoredChunk,
};
pub use embedding::{EmbeddingProvider, HashEmbeddingProvider};
pub use error::{PaperdexError, Result};
pub use extract::{ExtractedDocument, PdfExtractor};
pub use index::VectorIndex;
pub use inmemory::MemoryIndex;
pub use manager::{
    AddOutcome, BatchDetail, BatchReport, DocumentSource, MetadataOverrides, PaperManager,
    PaperManagerBuilder, Stats,
};
pub use persistent::PersistentIndex;

#[cfg(feature = "local-embeddings")]
pub use crate::fastembed::LocalEmbeddingProvider;

#[cfg(feature = "openai")]
pub use crate::openai::OpenAIEmbeddingProvider;

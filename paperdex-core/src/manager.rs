//! Paper management orchestrator.
//!
//! [`PaperManager`] coordinates the full workflow: extraction results →
//! chunker → vector index, while tracking per-document metadata in its own
//! registry. It is constructed explicitly through a builder and passed by
//! reference to whatever layer needs it — there is no ambient singleton.
//!
//! # Example
//!
//! ```rust,ignore
//! use paperdex_core::{PaperManager, PaperdexConfig, MemoryIndex};
//!
//! let manager = PaperManager::builder()
//!     .config(PaperdexConfig::default())
//!     .index(Arc::new(MemoryIndex::new(provider)))
//!     .build()?;
//!
//! manager.add_document(DocumentSource::Path(path.into()), None).await?;
//! let hits = manager.search("sparse attention", None, None).await?;
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::chunking::TextChunker;
use crate::config::PaperdexConfig;
use crate::document::{ChunkMetadata, DocumentMetadata, MetadataFilter, Paper, PaperHit};
use crate::error::{PaperdexError, Result};
use crate::extract::PdfExtractor;
use crate::index::VectorIndex;

/// Input to [`PaperManager::add_document`]: either a PDF path to run
/// through the extractor, or a pre-extracted `(text, metadata)` pair.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// A PDF file to extract.
    Path(PathBuf),
    /// Already-extracted text and metadata.
    Text {
        /// The raw document text.
        text: String,
        /// Metadata describing the document.
        metadata: DocumentMetadata,
    },
}

/// Caller-supplied metadata fields that override extracted values.
///
/// Set fields win over whatever extraction produced; unset fields leave
/// the extracted value in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataOverrides {
    /// Override the title.
    pub title: Option<String>,
    /// Override the author line.
    pub author: Option<String>,
    /// Override the publication year.
    pub year: Option<i32>,
}

impl MetadataOverrides {
    fn apply(&self, metadata: &mut DocumentMetadata) {
        if let Some(title) = &self.title {
            metadata.title = title.clone();
        }
        if let Some(author) = &self.author {
            metadata.author = author.clone();
        }
        if let Some(year) = self.year {
            metadata.year = Some(year);
        }
    }
}

/// Outcome of adding a single document.
#[derive(Debug, Clone)]
pub enum AddOutcome {
    /// The document was chunked, embedded, indexed, and registered.
    Added {
        /// The generated document ID.
        doc_id: String,
        /// How many chunks were indexed.
        chunks_added: usize,
        /// The document metadata as registered.
        metadata: DocumentMetadata,
    },
    /// Extraction produced zero chunks. Nothing was indexed or registered.
    /// A soft failure so batch and UI flows can continue.
    NoText {
        /// File name of the document that yielded no text.
        filename: String,
    },
}

/// Per-document record in a [`BatchReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDetail {
    /// File name of the processed document.
    pub filename: String,
    /// Document ID, when the document was added successfully.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// Number of chunks indexed for this document.
    pub chunks_added: usize,
    /// Error message, when the document failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of a batch add. Always returned in full: one
/// document's failure never aborts the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of documents attempted.
    pub total: usize,
    /// Number of documents indexed successfully.
    pub successful: usize,
    /// Number of documents that failed (including no-text documents).
    pub failed: usize,
    /// Total chunks indexed across the batch.
    pub total_chunks: usize,
    /// One record per attempted document.
    pub details: Vec<BatchDetail>,
}

/// Collection statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    /// Total chunk records in the index.
    pub total_chunks: usize,
    /// Total registered papers.
    pub total_papers: usize,
    /// Name of the backing collection.
    pub collection_name: String,
    /// Embedding model identifier.
    pub model_name: String,
    /// Configured chunk size in characters.
    pub chunk_size: usize,
    /// Configured chunk overlap in characters.
    pub chunk_overlap: usize,
}

/// The orchestrator tying extraction, chunking, and the vector index into
/// one cohesive API.
///
/// Owns the document registry and the composition rule linking documents to
/// chunk ids (`{doc_id}_chunk_{index}`). From the caller's perspective
/// [`add_document`](PaperManager::add_document) is atomic: either every
/// chunk is indexed and the paper registered, or the call fails and
/// nothing is registered.
pub struct PaperManager {
    config: PaperdexConfig,
    chunker: TextChunker,
    extractor: PdfExtractor,
    index: Arc<dyn VectorIndex>,
    papers: RwLock<HashMap<String, Paper>>,
}

impl std::fmt::Debug for PaperManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperManager")
            .field("config", &self.config)
            .field("chunker", &self.chunker)
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}

impl PaperManager {
    /// Create a new [`PaperManagerBuilder`].
    pub fn builder() -> PaperManagerBuilder {
        PaperManagerBuilder::default()
    }

    /// Return a reference to the manager configuration.
    pub fn config(&self) -> &PaperdexConfig {
        &self.config
    }

    /// Add one document: extract (if needed), chunk, embed, index, register.
    ///
    /// `overrides` fields win over extracted metadata on conflict. Zero
    /// chunks is reported as [`AddOutcome::NoText`] without touching the
    /// index.
    ///
    /// # Errors
    ///
    /// Returns [`PaperdexError::ExtractionError`] if a path source cannot
    /// be read, or [`PaperdexError::PipelineError`] if embedding or
    /// indexing fails. On error nothing is registered.
    pub async fn add_document(
        &self,
        source: DocumentSource,
        overrides: Option<MetadataOverrides>,
    ) -> Result<AddOutcome> {
        let (text, mut metadata, source_path) = match source {
            DocumentSource::Path(path) => {
                let extracted = self.extractor.extract(&path)?;
                (extracted.text, extracted.metadata, Some(path))
            }
            DocumentSource::Text { text, metadata } => (text, metadata, None),
        };

        if let Some(overrides) = &overrides {
            overrides.apply(&mut metadata);
        }

        let chunks = self.chunker.smart_chunk(&text);
        if chunks.is_empty() {
            warn!(filename = %metadata.filename, "document yielded no text");
            return Ok(AddOutcome::NoText { filename: metadata.filename });
        }

        let doc_id = Uuid::new_v4().to_string();
        let total_chunks = chunks.len();
        let chunk_metadatas: Vec<ChunkMetadata> = (0..total_chunks)
            .map(|chunk_index| ChunkMetadata {
                doc_id: doc_id.clone(),
                title: metadata.title.clone(),
                author: metadata.author.clone(),
                year: metadata.year,
                filename: metadata.filename.clone(),
                chunk_index,
                total_chunks,
            })
            .collect();
        let chunk_ids: Vec<String> =
            (0..total_chunks).map(|i| format!("{doc_id}_chunk_{i}")).collect();

        let chunks_added = self
            .index
            .add_documents(&chunks, Some(chunk_metadatas), Some(chunk_ids))
            .await
            .map_err(|e| {
                error!(doc_id = %doc_id, error = %e, "indexing failed");
                PaperdexError::PipelineError(format!(
                    "indexing failed for document '{}': {e}",
                    metadata.filename
                ))
            })?;

        let paper = Paper {
            doc_id: doc_id.clone(),
            metadata: metadata.clone(),
            source_path,
            chunk_count: chunks_added,
        };
        self.papers.write().await.insert(doc_id.clone(), paper);

        info!(doc_id = %doc_id, chunks_added, title = %metadata.title, "added document");
        Ok(AddOutcome::Added { doc_id, chunks_added, metadata })
    }

    /// Add a batch of PDF files sequentially.
    ///
    /// A failing document is recorded in the report and the batch moves on;
    /// this method itself never fails.
    pub async fn add_documents_batch(&self, paths: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport { total: paths.len(), ..BatchReport::default() };

        for path in paths {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            match self.add_document(DocumentSource::Path(path.clone()), None).await {
                Ok(AddOutcome::Added { doc_id, chunks_added, .. }) => {
                    report.successful += 1;
                    report.total_chunks += chunks_added;
                    report.details.push(BatchDetail {
                        filename,
                        doc_id: Some(doc_id),
                        chunks_added,
                        error: None,
                    });
                }
                Ok(AddOutcome::NoText { .. }) => {
                    report.failed += 1;
                    report.details.push(BatchDetail {
                        filename,
                        doc_id: None,
                        chunks_added: 0,
                        error: Some("no text extracted".to_string()),
                    });
                }
                Err(e) => {
                    report.failed += 1;
                    report.details.push(BatchDetail {
                        filename,
                        doc_id: None,
                        chunks_added: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!(
            total = report.total,
            successful = report.successful,
            failed = report.failed,
            total_chunks = report.total_chunks,
            "batch add finished"
        );
        report
    }

    /// Search the collection with a natural-language query.
    ///
    /// `top_k` defaults to the configured `default_top_k` and is clamped to
    /// `1..=max_top_k`. A blank query or an empty index yields an empty
    /// list, not an error.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
        filters: Option<MetadataFilter>,
    ) -> Result<Vec<PaperHit>> {
        let top_k = top_k.unwrap_or(self.config.default_top_k).clamp(1, self.config.max_top_k);
        let scored = self.index.search_with_scores(query, top_k, filters.as_ref()).await?;

        Ok(scored
            .into_iter()
            .map(|chunk| PaperHit {
                text: chunk.text,
                title: chunk.metadata.title,
                author: chunk.metadata.author,
                year: chunk.metadata.year,
                filename: chunk.metadata.filename,
                chunk_index: chunk.metadata.chunk_index,
                score: chunk.similarity_score,
            })
            .collect())
    }

    /// Delete every chunk of one paper and drop it from the registry.
    ///
    /// Returns the number of chunk records deleted (0 if the paper was
    /// unknown).
    pub async fn delete_paper(&self, doc_id: &str) -> Result<usize> {
        let deleted = self.index.delete_by_metadata(&MetadataFilter::for_doc(doc_id)).await?;
        self.papers.write().await.remove(doc_id);
        info!(doc_id = %doc_id, deleted, "deleted paper");
        Ok(deleted)
    }

    /// All registered papers, in no particular order.
    pub async fn list_papers(&self) -> Vec<Paper> {
        self.papers.read().await.values().cloned().collect()
    }

    /// Collection statistics.
    pub async fn stats(&self) -> Result<Stats> {
        Ok(Stats {
            total_chunks: self.index.count().await?,
            total_papers: self.papers.read().await.len(),
            collection_name: self.config.collection_name.clone(),
            model_name: self.config.model_name.clone(),
            chunk_size: self.config.chunk_size,
            chunk_overlap: self.config.chunk_overlap,
        })
    }

    /// Wipe the index and the paper registry. Irreversible.
    pub async fn reset(&self) -> Result<()> {
        self.index.reset().await?;
        self.papers.write().await.clear();
        warn!("paper manager reset");
        Ok(())
    }
}

/// Builder for constructing a [`PaperManager`].
///
/// `index` is required; `config` defaults to [`PaperdexConfig::default`].
#[derive(Default)]
pub struct PaperManagerBuilder {
    config: Option<PaperdexConfig>,
    index: Option<Arc<dyn VectorIndex>>,
}

impl PaperManagerBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PaperdexConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the vector index backend.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Build the [`PaperManager`], validating configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PaperdexError::ConfigError`] if `index` is missing or the
    /// chunker parameters are invalid.
    pub fn build(self) -> Result<PaperManager> {
        let config = self.config.unwrap_or_default();
        let index = self
            .index
            .ok_or_else(|| PaperdexError::ConfigError("index is required".to_string()))?;
        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)?;

        Ok(PaperManager {
            config,
            chunker,
            extractor: PdfExtractor::new(),
            index,
            papers: RwLock::new(HashMap::new()),
        })
    }
}

//! Data types for papers, chunks, filters, and search results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Metadata describing one source paper, as produced by extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    /// The paper title.
    pub title: String,
    /// The author line (possibly several names joined with commas).
    pub author: String,
    /// Publication year, when one could be determined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// The source file name.
    pub filename: String,
    /// Number of pages in the source document.
    pub pages: usize,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            author: "Unknown".to_string(),
            year: None,
            filename: String::new(),
            pages: 0,
        }
    }
}

/// A registered paper: document metadata plus bookkeeping owned by the
/// [`PaperManager`](crate::manager::PaperManager).
///
/// Immutable once registered, except for deletion. The vector index never
/// sees this type — it only stores per-chunk copies of the metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paper {
    /// Unique identifier for the paper.
    pub doc_id: String,
    /// Extracted (or caller-supplied) document metadata.
    pub metadata: DocumentMetadata,
    /// Path the paper was loaded from, when it came from a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    /// Number of chunks indexed for this paper.
    pub chunk_count: usize,
}

/// Per-chunk metadata stored alongside each indexed vector record.
///
/// A flat copy of the owning document's metadata plus the chunk's position,
/// so that document-level operations (delete a paper, filter by year) can be
/// expressed as metadata predicates over chunk records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// ID of the owning document.
    #[serde(default)]
    pub doc_id: String,
    /// Title of the owning document.
    #[serde(default)]
    pub title: String,
    /// Author line of the owning document.
    #[serde(default)]
    pub author: String,
    /// Publication year of the owning document, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// File name of the owning document.
    #[serde(default)]
    pub filename: String,
    /// 0-based position of this chunk within the document.
    #[serde(default)]
    pub chunk_index: usize,
    /// Total number of chunks produced for the document.
    #[serde(default)]
    pub total_chunks: usize,
}

/// An exact-match predicate over [`ChunkMetadata`] fields.
///
/// Unset fields match everything, so the default filter matches every
/// record. Field types are preserved (`year` is an integer, `title` and
/// `doc_id` are strings) rather than funnelled through a stringly map.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetadataFilter {
    /// Match records belonging to this document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// Match records from documents published in this year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Match records from documents with exactly this title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl MetadataFilter {
    /// A filter matching all chunks of one document.
    pub fn for_doc(doc_id: impl Into<String>) -> Self {
        Self { doc_id: Some(doc_id.into()), ..Self::default() }
    }

    /// A filter matching chunks from documents published in `year`.
    pub fn for_year(year: i32) -> Self {
        Self { year: Some(year), ..Self::default() }
    }

    /// Restrict the filter to a publication year.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Restrict the filter to an exact title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Whether `metadata` satisfies every field set on this filter.
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        if let Some(doc_id) = &self.doc_id {
            if metadata.doc_id != *doc_id {
                return false;
            }
        }
        if let Some(year) = self.year {
            if metadata.year != Some(year) {
                return false;
            }
        }
        if let Some(title) = &self.title {
            if metadata.title != *title {
                return false;
            }
        }
        true
    }

    /// Whether no field is set, i.e. the filter matches everything.
    pub fn is_empty(&self) -> bool {
        self.doc_id.is_none() && self.year.is_none() && self.title.is_none()
    }
}

/// One indexed vector record: chunk text, its embedding, and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkRecord {
    /// Globally unique record ID within a collection.
    pub id: String,
    /// The raw chunk text.
    pub text: String,
    /// The embedding vector for the chunk text.
    pub embedding: Vec<f32>,
    /// Flat metadata copied from the owning document.
    pub metadata: ChunkMetadata,
}

/// A retrieved chunk with its distance and similarity score.
///
/// `similarity_score = 1.0 - distance`, so higher is more relevant.
/// For normalized embeddings scores typically fall in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The record ID.
    pub id: String,
    /// The chunk text.
    pub text: String,
    /// The chunk metadata.
    pub metadata: ChunkMetadata,
    /// Cosine distance from the query (`1.0 - cosine similarity`).
    pub distance: f32,
    /// Cosine similarity to the query (higher is more relevant).
    pub similarity_score: f32,
}

/// A search result as exposed to callers of
/// [`PaperManager::search`](crate::manager::PaperManager::search).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperHit {
    /// The matching chunk text.
    pub text: String,
    /// Title of the paper the chunk belongs to.
    pub title: String,
    /// Author line of the paper.
    pub author: String,
    /// Publication year of the paper, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// File name of the paper.
    pub filename: String,
    /// Position of the chunk within the paper.
    pub chunk_index: usize,
    /// Similarity score (higher is more relevant).
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(doc_id: &str, year: Option<i32>, title: &str) -> ChunkMetadata {
        ChunkMetadata {
            doc_id: doc_id.to_string(),
            title: title.to_string(),
            year,
            ..ChunkMetadata::default()
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = MetadataFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&meta("a", Some(2024), "t")));
        assert!(filter.matches(&ChunkMetadata::default()));
    }

    #[test]
    fn doc_filter_matches_only_that_document() {
        let filter = MetadataFilter::for_doc("a");
        assert!(filter.matches(&meta("a", None, "")));
        assert!(!filter.matches(&meta("b", None, "")));
    }

    #[test]
    fn year_filter_rejects_unknown_year() {
        let filter = MetadataFilter::for_year(2024);
        assert!(filter.matches(&meta("a", Some(2024), "")));
        assert!(!filter.matches(&meta("a", Some(2023), "")));
        assert!(!filter.matches(&meta("a", None, "")));
    }

    #[test]
    fn combined_filter_requires_all_fields() {
        let filter = MetadataFilter::for_doc("a").with_year(2024).with_title("T");
        assert!(filter.matches(&meta("a", Some(2024), "T")));
        assert!(!filter.matches(&meta("a", Some(2024), "U")));
        assert!(!filter.matches(&meta("b", Some(2024), "T")));
    }

    #[test]
    fn chunk_metadata_deserializes_with_missing_fields() {
        let metadata: ChunkMetadata = serde_json::from_str(r#"{"doc_id":"x"}"#).unwrap();
        assert_eq!(metadata.doc_id, "x");
        assert_eq!(metadata.year, None);
        assert_eq!(metadata.total_chunks, 0);
    }
}

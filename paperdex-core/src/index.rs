//! Vector index trait for storing and searching embedded chunk records.

use async_trait::async_trait;

use crate::document::{ChunkMetadata, ChunkRecord, MetadataFilter, ScoredChunk};
use crate::error::Result;

/// Durable similarity search over chunk records, scoped to one collection.
///
/// Implementations own the physical storage of `(vector, text, metadata)`
/// records but have no concept of a document; document-level semantics are
/// expressed as metadata-filtered bulk operations. Queries are embedded
/// with the same provider the records were embedded with — the index holds
/// its embedding gateway for exactly that reason.
///
/// # Example
///
/// ```rust,ignore
/// use paperdex_core::{MemoryIndex, VectorIndex};
///
/// let index = MemoryIndex::new(provider);
/// index.add_documents(&texts, Some(metadatas), Some(ids)).await?;
/// let hits = index.search("neural retrieval", 5, None).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Embed `texts` and upsert one record per text.
    ///
    /// Returns the number of records written. An empty `texts` slice is a
    /// warned no-op returning 0, not an error. Omitted `ids` are generated
    /// as random UUIDs; omitted `metadatas` default to empty metadata.
    ///
    /// # Errors
    ///
    /// Returns [`PaperdexError::ConfigError`](crate::PaperdexError::ConfigError)
    /// if provided `metadatas` or `ids` do not match `texts` in length, or
    /// an embedding/backend error if those stages fail.
    async fn add_documents(
        &self,
        texts: &[String],
        metadatas: Option<Vec<ChunkMetadata>>,
        ids: Option<Vec<String>>,
    ) -> Result<usize>;

    /// Embed `query` and return the `top_k` nearest records by cosine
    /// similarity, optionally restricted to records matching `filter`.
    ///
    /// Results are ordered by descending similarity score; ties carry no
    /// further ordering guarantee. A blank query returns an empty result
    /// set without invoking the embedding step.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredChunk>>;

    /// Like [`search`](VectorIndex::search); each [`ScoredChunk`] already
    /// carries both `distance` and `similarity_score = 1.0 - distance`.
    async fn search_with_scores(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredChunk>> {
        self.search(query, top_k, filter).await
    }

    /// Delete all records matching `filter` and return how many were
    /// deleted. Zero matches is not an error.
    async fn delete_by_metadata(&self, filter: &MetadataFilter) -> Result<usize>;

    /// Total number of records in the collection.
    async fn count(&self) -> Result<usize>;

    /// Destroy the collection contents and recreate it empty. Irreversible.
    async fn reset(&self) -> Result<()>;
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Score `records` against `query_embedding`, keep those matching `filter`,
/// and return the `top_k` best by descending similarity.
pub(crate) fn rank_records<'a>(
    records: impl Iterator<Item = &'a ChunkRecord>,
    query_embedding: &[f32],
    top_k: usize,
    filter: Option<&MetadataFilter>,
) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = records
        .filter(|record| filter.is_none_or(|f| f.matches(&record.metadata)))
        .map(|record| {
            let similarity = cosine_similarity(&record.embedding, query_embedding);
            ScoredChunk {
                id: record.id.clone(),
                text: record.text.clone(),
                metadata: record.metadata.clone(),
                distance: 1.0 - similarity,
                similarity_score: similarity,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.similarity_score.partial_cmp(&a.similarity_score).unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(top_k);
    scored
}

/// Zip texts, metadata, ids, and embeddings into chunk records, validating
/// lengths and filling in defaults for omitted metadata and ids.
pub(crate) fn assemble_records(
    texts: &[String],
    metadatas: Option<Vec<ChunkMetadata>>,
    ids: Option<Vec<String>>,
    embeddings: Vec<Vec<f32>>,
) -> Result<Vec<ChunkRecord>> {
    use crate::error::PaperdexError;

    if let Some(metadatas) = &metadatas {
        if metadatas.len() != texts.len() {
            return Err(PaperdexError::ConfigError(format!(
                "metadatas length ({}) does not match texts length ({})",
                metadatas.len(),
                texts.len()
            )));
        }
    }
    if let Some(ids) = &ids {
        if ids.len() != texts.len() {
            return Err(PaperdexError::ConfigError(format!(
                "ids length ({}) does not match texts length ({})",
                ids.len(),
                texts.len()
            )));
        }
    }

    let ids = ids
        .unwrap_or_else(|| texts.iter().map(|_| uuid::Uuid::new_v4().to_string()).collect());
    let metadatas =
        metadatas.unwrap_or_else(|| vec![ChunkMetadata::default(); texts.len()]);

    Ok(texts
        .iter()
        .zip(ids)
        .zip(metadatas)
        .zip(embeddings)
        .map(|(((text, id), metadata), embedding)| ChunkRecord {
            id,
            text: text.clone(),
            embedding,
            metadata,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identities() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let neg = vec![-1.0, 0.0, 0.0];

        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
        assert!((cosine_similarity(&a, &neg) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_scores_zero() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn rank_records_filters_and_orders() {
        let records = vec![
            ChunkRecord {
                id: "a".into(),
                text: "near".into(),
                embedding: vec![1.0, 0.0],
                metadata: ChunkMetadata { year: Some(2024), ..ChunkMetadata::default() },
            },
            ChunkRecord {
                id: "b".into(),
                text: "far".into(),
                embedding: vec![0.0, 1.0],
                metadata: ChunkMetadata { year: Some(2024), ..ChunkMetadata::default() },
            },
            ChunkRecord {
                id: "c".into(),
                text: "filtered out".into(),
                embedding: vec![1.0, 0.0],
                metadata: ChunkMetadata { year: Some(2023), ..ChunkMetadata::default() },
            },
        ];

        let filter = MetadataFilter::for_year(2024);
        let hits = rank_records(records.iter(), &[1.0, 0.0], 10, Some(&filter));

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert!((hits[0].similarity_score - 1.0).abs() < 1e-6);
        assert!((hits[0].distance).abs() < 1e-6);
        assert_eq!(hits[1].id, "b");
    }
}

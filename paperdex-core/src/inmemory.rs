//! In-memory vector index using cosine similarity.
//!
//! [`MemoryIndex`] keeps chunk records in a `HashMap` behind a
//! `tokio::sync::RwLock`. Nothing survives process exit; for durable
//! collections use [`PersistentIndex`](crate::persistent::PersistentIndex).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::document::{ChunkMetadata, ChunkRecord, MetadataFilter, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::index::{assemble_records, rank_records, VectorIndex};

/// An in-memory [`VectorIndex`] suitable for tests and small collections.
///
/// Brute-force cosine search over all stored records. All operations are
/// async-safe via `tokio::sync::RwLock`.
pub struct MemoryIndex {
    provider: Arc<dyn EmbeddingProvider>,
    records: RwLock<HashMap<String, ChunkRecord>>,
}

impl MemoryIndex {
    /// Create an empty index that embeds with `provider`.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider, records: RwLock::new(HashMap::new()) }
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn add_documents(
        &self,
        texts: &[String],
        metadatas: Option<Vec<ChunkMetadata>>,
        ids: Option<Vec<String>>,
    ) -> Result<usize> {
        if texts.is_empty() {
            warn!("no texts provided to add_documents");
            return Ok(0);
        }

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = self.provider.embed_batch(&refs).await?;
        let new_records = assemble_records(texts, metadatas, ids, embeddings)?;

        let count = new_records.len();
        let mut records = self.records.write().await;
        for record in new_records {
            records.insert(record.id.clone(), record);
        }
        debug!(count, "added records to in-memory index");
        Ok(count)
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredChunk>> {
        if query.trim().is_empty() {
            warn!("empty query provided to search");
            return Ok(Vec::new());
        }

        let query_embedding = self.provider.embed(query).await?;
        let records = self.records.read().await;
        Ok(rank_records(records.values(), &query_embedding, top_k, filter))
    }

    async fn delete_by_metadata(&self, filter: &MetadataFilter) -> Result<usize> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !filter.matches(&record.metadata));
        let deleted = before - records.len();
        if deleted > 0 {
            debug!(deleted, "deleted records from in-memory index");
        }
        Ok(deleted)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }

    async fn reset(&self) -> Result<()> {
        self.records.write().await.clear();
        warn!("in-memory index reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbeddingProvider;

    fn index() -> MemoryIndex {
        MemoryIndex::new(Arc::new(HashEmbeddingProvider::new(32)))
    }

    #[tokio::test]
    async fn empty_input_is_a_noop() {
        let index = index();
        assert_eq!(index.add_documents(&[], None, None).await.unwrap(), 0);
        assert_eq!(index.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn blank_query_returns_empty_without_error() {
        let index = index();
        index.add_documents(&["some text".to_string()], None, None).await.unwrap();
        assert!(index.search("", 5, None).await.unwrap().is_empty());
        assert!(index.search("   ", 5, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_mismatched_metadata_length() {
        let index = index();
        let err = index
            .add_documents(
                &["a".to_string(), "b".to_string()],
                Some(vec![ChunkMetadata::default()]),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::PaperdexError::ConfigError(_)));
    }

    #[tokio::test]
    async fn upsert_replaces_records_with_same_id() {
        let index = index();
        let ids = Some(vec!["fixed".to_string()]);
        index.add_documents(&["first".to_string()], None, ids.clone()).await.unwrap();
        index.add_documents(&["second".to_string()], None, ids).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 1);

        let hits = index.search("second", 1, None).await.unwrap();
        assert_eq!(hits[0].text, "second");
    }

    #[tokio::test]
    async fn delete_by_metadata_returns_zero_for_no_match() {
        let index = index();
        index.add_documents(&["text".to_string()], None, None).await.unwrap();
        let deleted =
            index.delete_by_metadata(&MetadataFilter::for_doc("missing")).await.unwrap();
        assert_eq!(deleted, 0);
        assert_eq!(index.count().await.unwrap(), 1);
    }
}

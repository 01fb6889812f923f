//! File-backed vector index with the same semantics as
//! [`MemoryIndex`](crate::inmemory::MemoryIndex) plus durability.
//!
//! Each collection is one JSON snapshot file,
//! `<persist_directory>/<collection>.json`, holding every chunk record with
//! its embedding. The snapshot is loaded when the collection is opened —
//! so a restart recovers all records without re-embedding — and rewritten
//! after every mutation via a temp file and atomic rename.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::document::{ChunkMetadata, ChunkRecord, MetadataFilter, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::index::{assemble_records, rank_records, VectorIndex};

/// On-disk snapshot layout for one collection.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    collection: String,
    /// Model the records were embedded with. Advisory: a mismatch on reopen
    /// logs a warning but does not fail, since model consistency is a
    /// caller invariant.
    model_name: String,
    records: Vec<ChunkRecord>,
}

/// A durable [`VectorIndex`] backed by a JSON snapshot per collection.
///
/// Search is brute-force cosine over the in-memory copy of the records;
/// the snapshot exists purely so data survives process restart. Reopening
/// an existing collection by name preserves its contents.
///
/// # Example
///
/// ```rust,ignore
/// use paperdex_core::{PersistentIndex, VectorIndex};
///
/// let index = PersistentIndex::open("./chroma_db", "papers", provider)?;
/// index.add_documents(&texts, Some(metadatas), Some(ids)).await?;
/// // ...process restarts...
/// let index = PersistentIndex::open("./chroma_db", "papers", provider)?;
/// assert!(index.count().await? > 0);
/// ```
pub struct PersistentIndex {
    provider: Arc<dyn EmbeddingProvider>,
    collection_name: String,
    snapshot_path: PathBuf,
    records: RwLock<HashMap<String, ChunkRecord>>,
}

impl PersistentIndex {
    /// Open (or create) the collection `collection_name` under
    /// `persist_directory`, loading any existing snapshot.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created or the
    /// snapshot cannot be read, or a JSON error if an existing snapshot is
    /// corrupt.
    pub fn open(
        persist_directory: impl Into<PathBuf>,
        collection_name: impl Into<String>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let directory = persist_directory.into();
        let collection_name = collection_name.into();
        fs::create_dir_all(&directory)?;
        let snapshot_path = directory.join(format!("{collection_name}.json"));

        let records = if snapshot_path.exists() {
            let data = fs::read(&snapshot_path)?;
            let snapshot: Snapshot = serde_json::from_slice(&data)?;
            if snapshot.model_name != provider.model_name() {
                warn!(
                    stored = %snapshot.model_name,
                    current = %provider.model_name(),
                    "collection was embedded with a different model; \
                     mixing models in one collection gives meaningless scores"
                );
            }
            info!(
                collection = %collection_name,
                record_count = snapshot.records.len(),
                "loaded existing collection"
            );
            snapshot.records.into_iter().map(|r| (r.id.clone(), r)).collect()
        } else {
            info!(collection = %collection_name, "created new collection");
            HashMap::new()
        };

        Ok(Self { provider, collection_name, snapshot_path, records: RwLock::new(records) })
    }

    /// The name of the collection this index is scoped to.
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Write the snapshot to disk: serialize to a temp file in the same
    /// directory, then rename over the live snapshot so readers never see
    /// a partial write.
    fn persist(&self, records: &HashMap<String, ChunkRecord>) -> Result<()> {
        let snapshot = Snapshot {
            collection: self.collection_name.clone(),
            model_name: self.provider.model_name().to_string(),
            records: records.values().cloned().collect(),
        };
        let data = serde_json::to_vec(&snapshot)?;

        let temp_path = self.snapshot_path.with_extension("json.tmp");
        fs::write(&temp_path, data)?;
        fs::rename(&temp_path, &self.snapshot_path)?;
        debug!(
            collection = %self.collection_name,
            record_count = records.len(),
            "persisted snapshot"
        );
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for PersistentIndex {
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
        self.persist(&records)?;
        debug!(count, collection = %self.collection_name, "added records");
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
            self.persist(&records)?;
            debug!(deleted, collection = %self.collection_name, "deleted records");
        }
        Ok(deleted)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }

    async fn reset(&self) -> Result<()> {
        let mut records = self.records.write().await;
        records.clear();
        self.persist(&records)?;
        warn!(collection = %self.collection_name, "collection reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbeddingProvider;

    fn provider() -> Arc<dyn EmbeddingProvider> {
        Arc::new(HashEmbeddingProvider::new(16))
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let index = PersistentIndex::open(dir.path(), "papers", provider()).unwrap();
            index
                .add_documents(
                    &["alpha".to_string(), "beta".to_string()],
                    None,
                    Some(vec!["1".to_string(), "2".to_string()]),
                )
                .await
                .unwrap();
        }

        let reopened = PersistentIndex::open(dir.path(), "papers", provider()).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 2);

        let hits = reopened.search("alpha", 1, None).await.unwrap();
        assert_eq!(hits[0].text, "alpha");
    }

    #[tokio::test]
    async fn reset_clears_snapshot() {
        let dir = tempfile::tempdir().unwrap();

        let index = PersistentIndex::open(dir.path(), "papers", provider()).unwrap();
        index.add_documents(&["alpha".to_string()], None, None).await.unwrap();
        index.reset().await.unwrap();
        assert_eq!(index.count().await.unwrap(), 0);

        let reopened = PersistentIndex::open(dir.path(), "papers", provider()).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn collections_are_isolated_by_name() {
        let dir = tempfile::tempdir().unwrap();

        let first = PersistentIndex::open(dir.path(), "first", provider()).unwrap();
        first.add_documents(&["only in first".to_string()], None, None).await.unwrap();

        let second = PersistentIndex::open(dir.path(), "second", provider()).unwrap();
        assert_eq!(second.count().await.unwrap(), 0);
    }
}

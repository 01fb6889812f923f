//! Property tests for vector index search ordering and filtering.

use std::collections::HashSet;
use std::sync::Arc;

use paperdex_core::document::{ChunkMetadata, MetadataFilter};
use paperdex_core::embedding::HashEmbeddingProvider;
use paperdex_core::index::VectorIndex;
use paperdex_core::inmemory::MemoryIndex;
use proptest::prelude::*;

/// Generate a set of distinct non-blank texts.
fn arb_texts() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::hash_set("[a-z]{4,16}", 1..20)
        .prop_map(|set| set.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Searching an in-memory index returns results ordered by descending
    /// similarity score, bounded by both `top_k` and the number of stored
    /// records.
    #[test]
    fn results_ordered_descending_and_bounded_by_top_k(
        texts in arb_texts(),
        query in "[a-z]{4,16}",
        top_k in 1usize..25,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, stored) = rt.block_on(async {
            let index = MemoryIndex::new(Arc::new(HashEmbeddingProvider::new(16)));
            let stored = index.add_documents(&texts, None, None).await.unwrap();
            let results = index.search(&query, top_k, None).await.unwrap();
            (results, stored)
        });

        prop_assert_eq!(stored, texts.len());
        prop_assert!(results.len() <= top_k);
        prop_assert!(results.len() <= stored);

        for window in results.windows(2) {
            prop_assert!(
                window[0].similarity_score >= window[1].similarity_score,
                "results not in descending order: {} < {}",
                window[0].similarity_score,
                window[1].similarity_score,
            );
        }
        for result in &results {
            prop_assert!((result.similarity_score - (1.0 - result.distance)).abs() < 1e-6);
        }
    }

    /// A year filter restricts results to records carrying that year, for
    /// any partition of the records across two years.
    #[test]
    fn year_filter_restricts_results(
        texts in arb_texts(),
        mask in proptest::collection::vec(any::<bool>(), 20),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, expected_ids) = rt.block_on(async {
            let index = MemoryIndex::new(Arc::new(HashEmbeddingProvider::new(16)));

            let metadatas: Vec<ChunkMetadata> = texts
                .iter()
                .zip(&mask)
                .map(|(_, in_2024)| ChunkMetadata {
                    year: Some(if *in_2024 { 2024 } else { 2023 }),
                    ..ChunkMetadata::default()
                })
                .collect();
            let ids: Vec<String> = (0..texts.len()).map(|i| format!("id_{i}")).collect();
            let expected: HashSet<String> = ids
                .iter()
                .zip(&mask)
                .filter(|(_, in_2024)| **in_2024)
                .map(|(id, _)| id.clone())
                .collect();

            index.add_documents(&texts, Some(metadatas), Some(ids)).await.unwrap();
            let filter = MetadataFilter::for_year(2024);
            let results = index.search("anything", texts.len(), Some(&filter)).await.unwrap();
            (results, expected)
        });

        prop_assert_eq!(results.len(), expected_ids.len());
        for result in &results {
            prop_assert!(expected_ids.contains(&result.id));
        }
    }
}

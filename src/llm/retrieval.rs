use crate::document::Chunk;
use crate::error::{RagError, Result};
use crate::llm::embeddings::Embedding;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Embedding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    pub source: String,
    pub chunk_index: usize,
    pub score: f32,
}

/// Brute-force cosine-similarity search over an in-memory list of chunks.
///
/// Entries are kept in insertion order; equal scores rank earlier entries
/// first. All vectors must share one dimension, fixed by the first `add`.
#[derive(Debug, Default)]
pub struct RetrievalSystem {
    entries: Vec<IndexEntry>,
}

impl RetrievalSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, chunk: Chunk, embedding: Embedding) -> Result<()> {
        if embedding.is_empty() {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension().unwrap_or(1),
                actual: 0,
            });
        }
        if let Some(expected) = self.dimension() {
            if expected != embedding.len() {
                return Err(RagError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
        }
        self.entries.push(IndexEntry { chunk, embedding });
        Ok(())
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let expected = self.dimension().ok_or(RagError::EmptyIndex)?;
        if query.len() != expected {
            return Err(RagError::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.embedding)))
            .collect();

        // Stable sort keeps insertion order for ties.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(i, score)| {
                let chunk = &self.entries[i].chunk;
                SearchResult {
                    text: chunk.text.clone(),
                    source: chunk.source.clone(),
                    chunk_index: chunk.index,
                    score,
                }
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|e| e.embedding.len())
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

/// Cosine similarity in [-1, 1]. Zero-norm vectors score 0.0, and so do
/// non-finite results, so NaNs never reach the ranking.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a * norm_b).sqrt();
    if !similarity.is_finite() {
        return 0.0;
    }
    similarity.clamp(-1.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(vectors: &[Vec<f32>]) -> RetrievalSystem {
        let mut system = RetrievalSystem::new();
        for (i, v) in vectors.iter().enumerate() {
            system
                .add(Chunk::new(format!("chunk {}", i), "doc.txt", i), v.clone())
                .unwrap();
        }
        system
    }

    #[test]
    fn test_search_on_empty_index_fails() {
        let system = RetrievalSystem::new();
        assert!(matches!(system.search(&[1.0, 0.0], 3), Err(RagError::EmptyIndex)));
    }

    #[test]
    fn test_exact_match_ranks_first_with_similarity_one() {
        let system = index(&[vec![0.0, 1.0, 0.0], vec![0.3, 0.4, 0.5], vec![1.0, 0.0, 0.0]]);

        let results = system.search(&[0.3, 0.4, 0.5], 3).unwrap();

        assert_eq!(results[0].text, "chunk 1");
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_results_sorted_by_non_increasing_similarity() {
        let system = index(&[
            vec![1.0, 0.0],
            vec![-1.0, 0.0],
            vec![0.7, 0.7],
            vec![0.0, 1.0],
            vec![0.9, 0.1],
        ]);

        let results = system.search(&[1.0, 0.2], 5).unwrap();

        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(results.last().unwrap().text, "chunk 1");
    }

    #[test]
    fn test_returns_min_of_k_and_entry_count() {
        let system = index(&[vec![1.0, 0.0], vec![0.0, 1.0]]);

        let results = system.search(&[1.0, 0.5], 3).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "chunk 0");
        assert_eq!(results[1].text, "chunk 1");

        assert_eq!(system.search(&[1.0, 0.5], 1).unwrap().len(), 1);
        assert!(system.search(&[1.0, 0.5], 0).unwrap().is_empty());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let system = index(&[vec![0.0, 1.0], vec![2.0, 0.0], vec![5.0, 0.0], vec![1.0, 0.0]]);

        let results = system.search(&[1.0, 0.0], 4).unwrap();

        let order: Vec<usize> = results.iter().map(|r| r.chunk_index).collect();
        assert_eq!(order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_duplicate_chunks_are_kept() {
        let mut system = RetrievalSystem::new();
        system.add(Chunk::new("same", "a.txt", 0), vec![1.0, 0.0]).unwrap();
        system.add(Chunk::new("same", "b.txt", 0), vec![1.0, 0.0]).unwrap();

        let results = system.search(&[1.0, 0.0], 5).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "a.txt");
        assert_eq!(results[1].source, "b.txt");
    }

    #[test]
    fn test_dimension_is_enforced() {
        let mut system = index(&[vec![1.0, 0.0]]);

        let err = system.add(Chunk::new("x", "a.txt", 1), vec![1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 3 }));

        let err = system.search(&[1.0], 1).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 1 }));
        assert_eq!(system.len(), 1);
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), -1.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]) - 0.70710677).abs() < 1e-6);
    }
}

//! In-memory vector index over transcript chunks.
//!
//! A `VideoIndex` is built once per loaded video and never mutated. Loading
//! a new video builds a complete new index and swaps the session's handle,
//! so readers either see the old index or the new one, never a mix. A build
//! that fails partway returns an error and leaves nothing behind.

use crate::chunking::ContentChunk;
use crate::embedding::Embedder;
use crate::error::{Result, SvarError};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

/// A chunk paired with its embedding, owned by the index.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub chunk: ContentChunk,
    pub embedding: Vec<f32>,
}

/// A search hit: a chunk and its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: ContentChunk,
    pub score: f32,
}

/// Immutable nearest-neighbor index over one video's chunks.
pub struct VideoIndex {
    video_id: String,
    entries: Vec<IndexEntry>,
    built_at: DateTime<Utc>,
}

impl VideoIndex {
    /// Embed all chunks and build the index.
    ///
    /// Embedding happens in one batched pass; any failure aborts the whole
    /// build so no partial index ever exists.
    #[instrument(skip(chunks, embedder), fields(chunks = chunks.len()))]
    pub async fn build(
        video_id: &str,
        chunks: Vec<ContentChunk>,
        embedder: &dyn Embedder,
    ) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(SvarError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        debug!("Built index with {} entries", entries.len());

        Ok(Self {
            video_id: video_id.to_string(),
            entries,
            built_at: Utc::now(),
        })
    }

    /// An index with no entries, for videos whose transcript produced no
    /// chunks. Searching it returns nothing.
    pub fn empty(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            entries: Vec::new(),
            built_at: Utc::now(),
        }
    }

    /// Find the `k` chunks most similar to the query embedding, best first.
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Vec<ScoredChunk> {
        self.search_with_threshold(query_embedding, k, f32::MIN)
    }

    /// Like `search`, but drops results scoring below `min_score`.
    pub fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        k: usize,
        min_score: f32,
    ) -> Vec<ScoredChunk> {
        let mut results: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .filter(|r| r.score >= min_score)
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        results
    }

    /// Video this index was built from.
    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When this index was built.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Embedder that maps known words onto fixed axis-aligned vectors.
    struct MockEmbedder;

    #[async_trait]
    impl Embedder for MockEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(match text {
                t if t.contains("alpha") => vec![1.0, 0.0, 0.0],
                t if t.contains("beta") => vec![0.0, 1.0, 0.0],
                _ => vec![0.0, 0.0, 1.0],
            })
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    /// Embedder that always fails, for build-abort tests.
    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(SvarError::Embedding("service unreachable".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(SvarError::Embedding("service unreachable".to_string()))
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn chunk(content: &str, order: i32) -> ContentChunk {
        ContentChunk {
            content: content.to_string(),
            start_seconds: order as f64 * 10.0,
            end_seconds: (order + 1) as f64 * 10.0,
            first_segment: order as usize,
            last_segment: order as usize,
            order,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        // Mismatched or empty inputs score zero.
        assert_eq!(cosine_similarity(&a, &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[tokio::test]
    async fn test_build_and_search() {
        let chunks = vec![chunk("alpha topic", 0), chunk("beta topic", 1), chunk("other", 2)];
        let index = VideoIndex::build("video1", chunks, &MockEmbedder).await.unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.video_id(), "video1");

        let results = index.search(&[1.0, 0.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "alpha topic");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_search_never_exceeds_k() {
        let chunks = (0..10).map(|i| chunk(&format!("alpha {}", i), i)).collect();
        let index = VideoIndex::build("video1", chunks, &MockEmbedder).await.unwrap();

        assert_eq!(index.search(&[1.0, 0.0, 0.0], 4).len(), 4);
        assert_eq!(index.search(&[1.0, 0.0, 0.0], 100).len(), 10);
    }

    #[tokio::test]
    async fn test_failed_build_leaves_prior_index_usable() {
        let old = VideoIndex::build("video1", vec![chunk("alpha", 0)], &MockEmbedder)
            .await
            .unwrap();

        let rebuilt = VideoIndex::build("video2", vec![chunk("beta", 0)], &FailingEmbedder).await;
        assert!(matches!(rebuilt, Err(SvarError::Embedding(_))));

        // The old index is untouched and still answers queries.
        let results = old.search(&[1.0, 0.0, 0.0], 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.content, "alpha");
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing() {
        let index = VideoIndex::empty("video1");
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 0.0, 0.0], 5).is_empty());
    }

    #[tokio::test]
    async fn test_threshold_filters_low_scores() {
        let chunks = vec![chunk("alpha", 0), chunk("beta", 1)];
        let index = VideoIndex::build("video1", chunks, &MockEmbedder).await.unwrap();

        let results = index.search_with_threshold(&[1.0, 0.0, 0.0], 10, 0.5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.content, "alpha");
    }
}

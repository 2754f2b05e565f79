//! Retrieval and context assembly for RAG.

use super::ContextChunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::VideoIndex;
use std::sync::Arc;

/// Retrieves the chunks most relevant to a question from a video index.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    min_score: f32,
}

impl Retriever {
    /// Create a new retriever.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            top_k: 6,
            min_score: 0.0,
        }
    }

    /// Set the number of chunks to retrieve.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Embed the query and fetch the top matches from the index.
    ///
    /// An empty index short-circuits to an empty result without spending an
    /// embedding call.
    pub async fn retrieve(&self, index: &VideoIndex, query: &str) -> Result<Vec<ContextChunk>> {
        if index.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let results = index.search_with_threshold(&query_embedding, self.top_k, self.min_score);

        Ok(results
            .into_iter()
            .map(|r| ContextChunk::from_scored(r, index.video_id()))
            .collect())
    }
}

/// Format context chunks as the context block of a prompt.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            format!("---\n[{}] @ {}\n{}\n---", i + 1, chunk.timestamp, chunk.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ScoredChunk;
    use crate::chunking::ContentChunk;

    fn context_chunk(content: &str, start: f64, score: f32) -> ContextChunk {
        ContextChunk::from_scored(
            ScoredChunk {
                chunk: ContentChunk {
                    content: content.to_string(),
                    start_seconds: start,
                    end_seconds: start + 10.0,
                    first_segment: 0,
                    last_segment: 0,
                    order: 0,
                },
                score,
            },
            "dQw4w9WgXcQ",
        )
    }

    #[test]
    fn test_format_context_for_prompt() {
        let chunks = vec![
            context_chunk("first excerpt", 65.0, 0.9),
            context_chunk("second excerpt", 130.0, 0.8),
        ];

        let formatted = format_context_for_prompt(&chunks);

        assert!(formatted.contains("[1] @ 01:05"));
        assert!(formatted.contains("first excerpt"));
        assert!(formatted.contains("[2] @ 02:10"));
        assert!(formatted.contains("second excerpt"));
    }

    #[test]
    fn test_context_chunk_url() {
        let chunk = context_chunk("text", 42.0, 0.5);
        assert_eq!(chunk.url, "https://youtube.com/watch?v=dQw4w9WgXcQ&t=42s");
    }
}

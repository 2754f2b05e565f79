//! RAG (Retrieval-Augmented Generation) for grounded question answering.
//!
//! Answers questions about the loaded video from its indexed transcript
//! chunks, with timestamped sources alongside each answer.

pub mod context;
mod response;

pub use context::Retriever;
pub use response::{RagEngine, RagResponse};

use crate::index::ScoredChunk;
use crate::youtube::url_with_timestamp;

/// A retrieved chunk formatted for prompts and display.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    /// Formatted timestamp (e.g., "02:34").
    pub timestamp: String,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
    /// Watch URL pointing at this chunk's start time.
    pub url: String,
}

impl ContextChunk {
    /// Build a context chunk from a search hit against `video_id`'s index.
    pub fn from_scored(result: ScoredChunk, video_id: &str) -> Self {
        Self {
            timestamp: result.chunk.format_timestamp(),
            start_seconds: result.chunk.start_seconds,
            url: url_with_timestamp(video_id, result.chunk.start_seconds),
            content: result.chunk.content,
            score: result.score,
        }
    }
}

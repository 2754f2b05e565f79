//! Per-session pipeline coordination.
//!
//! A `Session` owns the state for one user: the currently loaded video, its
//! summary, and its vector index. Loading a video runs the full pipeline
//! (fetch, chunk, embed, index, summarize) into local values and replaces
//! the previous state only when every step succeeded, so a failed load
//! leaves the prior video fully queryable.

use crate::chunking::{chunk_transcript, ChunkingConfig};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SvarError};
use crate::index::VideoIndex;
use crate::rag::{RagEngine, RagResponse};
use crate::summarize::Summarizer;
use crate::transcript::Transcript;
use crate::youtube::{parse_video_id, VideoMetadata, YoutubeClient};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// State for one loaded video.
pub struct LoadedVideo {
    /// Video metadata (placeholder title when no Data API key is set).
    pub metadata: VideoMetadata,
    /// The fetched transcript.
    pub transcript: Transcript,
    /// Cached summary; absent when the transcript had no content.
    pub summary: Option<String>,
    /// Vector index over the transcript chunks.
    pub index: Arc<VideoIndex>,
}

/// Result of loading a video.
#[derive(Debug)]
pub struct LoadResult {
    /// Video ID.
    pub video_id: String,
    /// Title (or the video ID when metadata was unavailable).
    pub title: String,
    /// Number of chunks indexed.
    pub chunks_indexed: usize,
}

/// A single user's session.
pub struct Session {
    settings: Settings,
    youtube: YoutubeClient,
    embedder: Arc<dyn Embedder>,
    engine: RagEngine,
    summarizer: Summarizer,
    video: Option<LoadedVideo>,
}

impl Session {
    /// Create a session from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let youtube = YoutubeClient::new(&settings.youtube)?;

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let engine = RagEngine::new(embedder.clone(), &settings.rag, prompts.clone());
        let summarizer = Summarizer::new(&settings.summary, prompts);

        Ok(Self {
            settings,
            youtube,
            embedder,
            engine,
            summarizer,
            video: None,
        })
    }

    /// Override the chat model used for answers.
    pub fn with_rag_model(mut self, model: &str) -> Self {
        self.engine = self.engine.with_model(model);
        self
    }

    /// The settings this session was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The currently loaded video, if any.
    pub fn current(&self) -> Option<&LoadedVideo> {
        self.video.as_ref()
    }

    /// The cached summary of the current video, if any.
    pub fn summary(&self) -> Option<&str> {
        self.video.as_ref().and_then(|v| v.summary.as_deref())
    }

    /// Load a video: fetch transcript and metadata, chunk, index, summarize.
    ///
    /// Replaces the previous video wholesale on success; any failure leaves
    /// the session exactly as it was.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn load_video(&mut self, input: &str) -> Result<LoadResult> {
        let video_id = parse_video_id(input).ok_or_else(|| {
            SvarError::InvalidInput(format!("Not a YouTube URL or video ID: {}", input))
        })?;

        // Metadata is best-effort; captions decide whether the load succeeds.
        let metadata = match self.youtube.fetch_metadata(&video_id).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => VideoMetadata::untitled(&video_id),
            Err(e) => {
                warn!("Metadata lookup failed, continuing without: {}", e);
                VideoMetadata::untitled(&video_id)
            }
        };

        info!("Fetching transcript for {}", video_id);
        let transcript = self.youtube.fetch_transcript(&video_id).await?;

        let chunking = ChunkingConfig {
            chunk_size: self.settings.chunking.chunk_size,
            chunk_overlap: self.settings.chunking.chunk_overlap,
        };
        let chunks = chunk_transcript(&transcript, &chunking)?;

        let (index, summary) = if chunks.is_empty() {
            info!("Transcript for {} has no content", video_id);
            (VideoIndex::empty(&video_id), None)
        } else {
            info!("Indexing {} chunks for {}", chunks.len(), video_id);
            let index = VideoIndex::build(&video_id, chunks.clone(), self.embedder.as_ref()).await?;

            info!("Summarizing {}", video_id);
            let summary = self
                .summarizer
                .summarize(&metadata.title, &transcript, &chunks)
                .await?;

            (index, Some(summary))
        };

        let chunks_indexed = index.len();
        let title = metadata.title.clone();

        // Everything succeeded; replace the previous video in one step.
        self.video = Some(LoadedVideo {
            metadata,
            transcript,
            summary,
            index: Arc::new(index),
        });

        Ok(LoadResult {
            video_id,
            title,
            chunks_indexed,
        })
    }

    /// Answer a question about the current video.
    ///
    /// Returns `EmptyContent` when no video is loaded or the loaded video
    /// had no transcript content.
    pub async fn ask(&self, question: &str) -> Result<RagResponse> {
        let video = self.video.as_ref().ok_or(SvarError::EmptyContent)?;
        self.engine
            .ask(&video.index, &video.metadata.title, question)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ask_without_loaded_video_is_empty_content() {
        let session = Session::new(Settings::default()).unwrap();
        let result = session.ask("what is this about?").await;
        assert!(matches!(result, Err(SvarError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_bad_input_leaves_state_untouched() {
        let mut session = Session::new(Settings::default()).unwrap();
        let result = session.load_video("not a url at all").await;
        assert!(matches!(result, Err(SvarError::InvalidInput(_))));
        assert!(session.current().is_none());
    }
}

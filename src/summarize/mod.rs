//! Video summarization.
//!
//! Produces a short prose summary of a transcript. Transcripts that fit the
//! configured context budget are summarized in a single call; longer ones go
//! through a deterministic two-level reduce: summarize each chunk, then
//! summarize the concatenated chunk summaries.

use crate::chunking::ContentChunk;
use crate::config::{Prompts, SummarySettings};
use crate::error::{Result, SvarError};
use crate::openai::create_client;
use crate::transcript::Transcript;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Summarizer for loaded videos. Stateless between calls.
pub struct Summarizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    max_tokens: u32,
    context_budget_chars: usize,
    max_concurrency: usize,
    prompts: Prompts,
}

impl Summarizer {
    /// Create a new summarizer.
    pub fn new(settings: &SummarySettings, prompts: Prompts) -> Self {
        Self {
            client: create_client(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            context_budget_chars: settings.context_budget_chars,
            max_concurrency: settings.max_concurrency.max(1),
            prompts,
        }
    }

    /// Whether a transcript is too long for a single summarization call.
    pub fn needs_reduce(&self, transcript: &Transcript) -> bool {
        transcript.full_text.len() > self.context_budget_chars
    }

    /// Summarize a transcript.
    ///
    /// `chunks` are the transcript's retrieval chunks, reused as the map
    /// units when the transcript exceeds the context budget.
    #[instrument(skip(self, transcript, chunks), fields(video_id = %transcript.video_id))]
    pub async fn summarize(
        &self,
        title: &str,
        transcript: &Transcript,
        chunks: &[ContentChunk],
    ) -> Result<String> {
        if transcript.is_empty() {
            return Err(SvarError::EmptyContent);
        }

        if self.needs_reduce(transcript) {
            info!("Transcript over context budget, using two-level reduce");
            self.summarize_map_reduce(title, chunks).await
        } else {
            self.summarize_stuff(title, transcript).await
        }
    }

    /// Single-call summarization of the whole transcript.
    async fn summarize_stuff(&self, title: &str, transcript: &Transcript) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), title.to_string());
        vars.insert("transcript".to_string(), transcript.full_text.clone());

        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.summary.user, &vars);

        self.complete(user_prompt).await
    }

    /// Two-level reduce: summarize each chunk, then combine the summaries.
    async fn summarize_map_reduce(&self, title: &str, chunks: &[ContentChunk]) -> Result<String> {
        // Build the per-chunk futures eagerly into a `Vec` of `dyn Future + Send`
        // trait objects. Kept lazy inside `stream::iter(...map...)`, the closure
        // returning a future that borrows `chunk` is not treated as
        // higher-ranked-general, and its `Send` leakage poisons the enclosing
        // axum handler's `Send` bound (rust-lang/rust#102211). Futures are inert
        // until polled, so materializing them up front changes no behavior.
        let chunk_futures: Vec<_> = chunks
            .iter()
            .map(|chunk| self.summarize_chunk(chunk).boxed())
            .collect();
        let chunk_summaries: Vec<Result<String>> = stream::iter(chunk_futures)
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let chunk_summaries: Vec<String> =
            chunk_summaries.into_iter().collect::<Result<Vec<_>>>()?;

        debug!("Reduced {} chunk summaries", chunk_summaries.len());

        let numbered: String = chunk_summaries
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut vars = HashMap::new();
        vars.insert("title".to_string(), title.to_string());
        vars.insert("summaries".to_string(), numbered);

        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.summary.reduce, &vars);

        self.complete(user_prompt).await
    }

    /// Map phase: summarize one chunk.
    async fn summarize_chunk(&self, chunk: &ContentChunk) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("chunk".to_string(), chunk.content.clone());

        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.summary.map, &vars);

        self.complete(user_prompt).await
    }

    /// One chat completion with the summary system prompt.
    async fn complete(&self, user_prompt: String) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.summary.system.clone())
                .build()
                .map_err(|e| SvarError::AnswerGeneration(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| SvarError::AnswerGeneration(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(self.max_tokens)
            .build()
            .map_err(|e| SvarError::AnswerGeneration(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvarError::AnswerGeneration(format!("Chat API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| SvarError::AnswerGeneration("Empty response from model".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptSegment;

    fn summarizer_with_budget(budget: usize) -> Summarizer {
        let settings = SummarySettings {
            context_budget_chars: budget,
            ..Default::default()
        };
        Summarizer::new(&settings, Prompts::default())
    }

    #[tokio::test]
    async fn test_empty_transcript_is_empty_content() {
        let summarizer = summarizer_with_budget(1000);
        let transcript = Transcript::new("video1".to_string(), Vec::new());

        let result = summarizer.summarize("Title", &transcript, &[]).await;
        assert!(matches!(result, Err(SvarError::EmptyContent)));
    }

    #[test]
    fn test_needs_reduce_thresholds() {
        let transcript = Transcript::new(
            "video1".to_string(),
            vec![TranscriptSegment::new(0.0, 5.0, "a".repeat(100))],
        );

        assert!(!summarizer_with_budget(100).needs_reduce(&transcript));
        assert!(summarizer_with_budget(99).needs_reduce(&transcript));
    }
}

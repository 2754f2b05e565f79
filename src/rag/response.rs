//! RAG answer generation.

use super::{context::format_context_for_prompt, ContextChunk, Retriever};
use crate::config::{Prompts, RagSettings};
use crate::embedding::Embedder;
use crate::error::{Result, SvarError};
use crate::index::VideoIndex;
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// RAG engine for question answering over a video index.
pub struct RagEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    retriever: Retriever,
    prompts: Prompts,
}

impl RagEngine {
    /// Create a new RAG engine.
    pub fn new(embedder: Arc<dyn Embedder>, settings: &RagSettings, prompts: Prompts) -> Self {
        let retriever = Retriever::new(embedder)
            .with_top_k(settings.top_k)
            .with_min_score(settings.min_score);

        Self {
            client: create_client(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            retriever,
            prompts,
        }
    }

    /// Override the chat model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Answer a question from the given index.
    ///
    /// Short-circuits with `EmptyContent` when there is nothing to retrieve,
    /// before any model call is made.
    #[instrument(skip(self, index, title), fields(question = %question))]
    pub async fn ask(&self, index: &VideoIndex, title: &str, question: &str) -> Result<RagResponse> {
        if index.is_empty() {
            return Err(SvarError::EmptyContent);
        }

        info!("Answering question against {} indexed chunks", index.len());

        let context_chunks = self.retriever.retrieve(index, question).await?;

        if context_chunks.is_empty() {
            return Err(SvarError::EmptyContent);
        }

        let context_text = format_context_for_prompt(&context_chunks);

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("title".to_string(), title.to_string());
        vars.insert("context".to_string(), context_text);

        let user_prompt = self.prompts.render_with_custom(&self.prompts.rag.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.rag.system.clone())
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
            .temperature(self.temperature)
            .build()
            .map_err(|e| SvarError::AnswerGeneration(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvarError::AnswerGeneration(format!("Chat API error: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SvarError::AnswerGeneration("Empty response from model".to_string()))?
            .clone();

        debug!("Generated answer with {} sources", context_chunks.len());

        Ok(RagResponse {
            answer,
            sources: context_chunks,
        })
    }
}

/// A RAG response with answer and sources.
#[derive(Debug, Clone)]
pub struct RagResponse {
    /// The generated answer, verbatim from the model.
    pub answer: String,
    /// Source chunks used for the answer.
    pub sources: Vec<ContextChunk>,
}

impl RagResponse {
    /// Format the response for terminal display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.sources {
                output.push_str(&format!(
                    "\n@ {} (score: {:.2})\n  {}",
                    source.timestamp, source.score, source.url
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct UnreachableEmbedder;

    #[async_trait]
    impl Embedder for UnreachableEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            panic!("embedder must not be called for an empty index");
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            panic!("embedder must not be called for an empty index");
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    #[tokio::test]
    async fn test_empty_index_short_circuits_before_any_call() {
        let engine = RagEngine::new(
            Arc::new(UnreachableEmbedder),
            &RagSettings::default(),
            Prompts::default(),
        );

        let index = VideoIndex::empty("video1");
        let result = engine.ask(&index, "Some Video", "what is this about?").await;

        assert!(matches!(result, Err(SvarError::EmptyContent)));
    }

    #[test]
    fn test_response_display_includes_sources() {
        let response = RagResponse {
            answer: "The answer.".to_string(),
            sources: vec![ContextChunk {
                timestamp: "01:05".to_string(),
                start_seconds: 65.0,
                content: "excerpt".to_string(),
                score: 0.91,
                url: "https://youtube.com/watch?v=x&t=65s".to_string(),
            }],
        };

        let display = response.format_for_display();
        assert!(display.starts_with("The answer."));
        assert!(display.contains("01:05"));
        assert!(display.contains("0.91"));
    }
}

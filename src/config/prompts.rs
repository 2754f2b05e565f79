//! Prompt templates for Svar.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory configured under `[prompts]`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub rag: RagPrompts,
    pub summary: SummaryPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for RAG answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    pub user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant that answers questions about a YouTube video using excerpts from its transcript.

Guidelines:
- Answer using only the provided transcript excerpts
- Cite timestamps in the format [MM:SS] when a claim comes from a specific excerpt
- If the excerpts do not contain the answer, say so clearly instead of guessing
- Be concise but complete"#
                .to_string(),

            user: r#"Question: {{question}}

Relevant transcript excerpts from "{{title}}":

{{context}}

Answer the question based on the excerpts above."#
                .to_string(),
        }
    }
}

/// Prompts for video summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub system: String,
    /// Template for summarizing a transcript that fits in one call.
    pub user: String,
    /// Template for summarizing a single chunk (map phase).
    pub map: String,
    /// Template for combining chunk summaries (reduce phase).
    pub reduce: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a careful summarizer of video transcripts. Write in plain prose, preserve the speaker's key claims and conclusions, and never invent content that is not in the transcript."#.to_string(),

            user: r#"Summarize the following video transcript in a few short paragraphs. Cover the main topics in order and end with the key takeaways.

Video title: {{title}}

Transcript:
{{transcript}}"#
                .to_string(),

            map: r#"Summarize this portion of a video transcript in 2-3 sentences, keeping concrete facts and names:

{{chunk}}"#
                .to_string(),

            reduce: r#"The following are ordered summaries of consecutive portions of one video. Combine them into a single coherent summary of the whole video, a few short paragraphs long, ending with the key takeaways.

Video title: {{title}}

Portion summaries:
{{summaries}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from defaults, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom
    /// config variables. Provided variables take precedence.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.rag.system.is_empty());
        assert!(!prompts.summary.map.is_empty());
        assert!(prompts.rag.user.contains("{{question}}"));
        assert!(prompts.summary.reduce.contains("{{summaries}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_custom_variables_lose_to_provided() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("name".to_string(), "config".to_string());

        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "caller".to_string());

        let result = prompts.render_with_custom("{{name}}", &vars);
        assert_eq!(result, "caller");
    }
}

//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use crate::error::{Result, SvarError};

/// Run the config command.
pub fn run_config(action: &ConfigAction, mut settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| SvarError::Config(format!("Failed to serialize config: {}", e)))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            set_value(&mut settings, key, value)?;
            settings.validate()?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor).arg(&config_path).status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply a dotted-key assignment to the settings.
fn set_value(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    let parse_usize = |v: &str| {
        v.parse::<usize>()
            .map_err(|_| SvarError::InvalidInput(format!("Expected a number, got '{}'", v)))
    };
    let parse_f32 = |v: &str| {
        v.parse::<f32>()
            .map_err(|_| SvarError::InvalidInput(format!("Expected a number, got '{}'", v)))
    };

    match key {
        "general.log_level" => settings.general.log_level = value.to_string(),
        "youtube.api_key" => settings.youtube.api_key = Some(value.to_string()),
        "youtube.languages" => {
            settings.youtube.languages =
                value.split(',').map(|s| s.trim().to_string()).collect();
        }
        "embedding.model" => settings.embedding.model = value.to_string(),
        "embedding.dimensions" => settings.embedding.dimensions = parse_usize(value)? as u32,
        "chunking.chunk_size" => settings.chunking.chunk_size = parse_usize(value)?,
        "chunking.chunk_overlap" => settings.chunking.chunk_overlap = parse_usize(value)?,
        "rag.model" => settings.rag.model = value.to_string(),
        "rag.top_k" => settings.rag.top_k = parse_usize(value)?,
        "rag.min_score" => settings.rag.min_score = parse_f32(value)?,
        "rag.temperature" => settings.rag.temperature = parse_f32(value)?,
        "summary.model" => settings.summary.model = value.to_string(),
        "summary.max_tokens" => settings.summary.max_tokens = parse_usize(value)? as u32,
        "summary.context_budget_chars" => {
            settings.summary.context_budget_chars = parse_usize(value)?
        }
        _ => {
            return Err(SvarError::InvalidInput(format!(
                "Unknown config key: {}. Use 'svar config show' to list keys.",
                key
            )))
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_known_keys() {
        let mut settings = Settings::default();

        set_value(&mut settings, "rag.model", "gpt-4o").unwrap();
        assert_eq!(settings.rag.model, "gpt-4o");

        set_value(&mut settings, "rag.top_k", "3").unwrap();
        assert_eq!(settings.rag.top_k, 3);

        set_value(&mut settings, "youtube.languages", "de, en").unwrap();
        assert_eq!(settings.youtube.languages, vec!["de", "en"]);
    }

    #[test]
    fn test_set_rejects_unknown_key_and_bad_value() {
        let mut settings = Settings::default();
        assert!(set_value(&mut settings, "nope.nope", "x").is_err());
        assert!(set_value(&mut settings, "rag.top_k", "many").is_err());
    }
}

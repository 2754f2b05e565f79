//! Doctor command - verify configuration and API key setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    message: String,
    hint: Option<String>,
}

#[derive(Debug, PartialEq)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> crate::error::Result<()> {
    Output::header("Svar Doctor");
    println!();
    println!("Checking configuration and API keys...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Keys").bold());
    checks.push(check_env_key(
        "OPENAI_API_KEY",
        true,
        "Required for embeddings, summaries, and answers. export OPENAI_API_KEY='sk-...'",
    ));
    checks.push(check_env_key(
        "YOUTUBE_API_KEY",
        false,
        "Optional; without it video titles fall back to the video ID. export YOUTUBE_API_KEY='...'",
    ));
    for check in &checks {
        check.print();
    }

    println!("\n{}", style("Configuration").bold());
    let config_checks = check_config(settings);
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!("\n{}", style("Effective Settings").bold());
    Output::kv("Chat model", &settings.rag.model);
    Output::kv("Embedding model", &settings.embedding.model);
    Output::kv(
        "Chunking",
        &format!(
            "{} words, {} overlap",
            settings.chunking.chunk_size, settings.chunking.chunk_overlap
        ),
    );
    Output::kv("Top-K", &settings.rag.top_k.to_string());
    Output::kv(
        "Caption languages",
        &settings.youtube.languages.join(", "),
    );

    println!();
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!("{} check(s) failed.", errors));
    } else if warnings > 0 {
        Output::warning(&format!("Ready, with {} warning(s).", warnings));
    } else {
        Output::success("Everything looks good.");
    }

    Ok(())
}

fn check_env_key(name: &str, required: bool, hint: &str) -> CheckResult {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => CheckResult::ok(name, "configured"),
        _ if required => CheckResult::error(name, "not set", hint),
        _ => CheckResult::warning(name, "not set", hint),
    }
}

fn check_config(settings: &Settings) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        checks.push(CheckResult::ok(
            "config file",
            &format!("{}", config_path.display()),
        ));
    } else {
        checks.push(CheckResult::warning(
            "config file",
            "not found (using defaults)",
            "Create one with: svar config edit",
        ));
    }

    match settings.validate() {
        Ok(()) => checks.push(CheckResult::ok("settings", "valid")),
        Err(e) => checks.push(CheckResult::error(
            "settings",
            &e.to_string(),
            "Fix the value with: svar config edit",
        )),
    }

    checks
}

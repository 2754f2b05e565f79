//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::session::Session;

/// Run the ask command: load a video and answer one question about it.
pub async fn run_ask(
    input: &str,
    question: &str,
    model: Option<String>,
    top_k: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e);
    }

    if let Some(top_k) = top_k {
        settings.rag.top_k = top_k;
    }

    let mut session = Session::new(settings)?;
    if let Some(model) = model {
        session = session.with_rag_model(&model);
    }

    let spinner = Output::spinner("Loading video...");
    let load = session.load_video(input).await;
    spinner.finish_and_clear();

    let result = load?;
    Output::info(&format!("Loaded \"{}\"", result.title));

    let spinner = Output::spinner("Thinking...");

    match session.ask(question).await {
        Ok(response) => {
            spinner.finish_and_clear();
            println!("\n{}\n", response.answer);

            if !response.sources.is_empty() {
                Output::header("Sources");
                for source in &response.sources {
                    Output::source(&source.timestamp, source.score, &source.content, &source.url);
                }
            }
            Ok(())
        }
        Err(e) if e.is_empty_content() => {
            spinner.finish_and_clear();
            Output::warning("No content to answer from.");
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            Err(e)
        }
    }
}

//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::session::Session;

/// Run the summarize command: load a video and print its summary.
pub async fn run_summarize(input: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::LoadVideo) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e);
    }

    let mut session = Session::new(settings)?;

    let spinner = Output::spinner("Loading and summarizing video...");
    let load = session.load_video(input).await;
    spinner.finish_and_clear();

    let result = load?;

    match session.summary() {
        Some(summary) => {
            Output::header(&result.title);
            println!("{}", summary);
        }
        None => {
            Output::warning("No content to summarize.");
        }
    }

    Ok(())
}

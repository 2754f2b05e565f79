//! Interactive session command.
//!
//! A small REPL over one session: load a video, read its summary, ask
//! questions. One action runs at a time; the next prompt appears only when
//! the previous action finished.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::{Result, SvarError};
use crate::session::Session;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive session command.
pub async fn run_session(
    input: Option<String>,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::LoadVideo) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e);
    }

    let mut session = Session::new(settings)?;
    if let Some(model) = model {
        session = session.with_rag_model(&model);
    }

    println!("\n{}", style("Svar").bold().cyan());
    println!(
        "{}\n",
        style("Commands: load <url|id>, summary, exit. Anything else is asked as a question.")
            .dim()
    );

    if let Some(input) = input {
        load_video(&mut session, &input).await;
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("svar>").green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if line.eq_ignore_ascii_case("help") {
            print_help();
            continue;
        }

        if line.eq_ignore_ascii_case("summary") {
            show_summary(&session);
            continue;
        }

        if let Some(rest) = line.strip_prefix("load ") {
            load_video(&mut session, rest.trim()).await;
            continue;
        }

        // Everything else is a question about the loaded video.
        let question = line.strip_prefix("ask ").unwrap_or(line);
        ask_question(&session, question).await;
    }

    Ok(())
}

fn print_help() {
    println!("  load <url|id>   Load a video and build its index");
    println!("  summary         Show the summary of the loaded video");
    println!("  ask <question>  Ask about the loaded video (prefix optional)");
    println!("  exit            Leave the session");
}

async fn load_video(session: &mut Session, input: &str) {
    let spinner = Output::spinner("Loading video (transcript, index, summary)...");

    match session.load_video(input).await {
        Ok(result) => {
            spinner.finish_and_clear();
            Output::success(&format!(
                "Loaded \"{}\" ({} chunks indexed)",
                result.title, result.chunks_indexed
            ));
            if result.chunks_indexed == 0 {
                Output::warning("This video's transcript has no content to search.");
            } else {
                show_summary(session);
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            match &e {
                SvarError::TranscriptUnavailable(_) => {
                    Output::error(&format!("{}", e));
                    Output::info("The video may have captions disabled or be restricted.");
                }
                _ => Output::error(&format!("Failed to load video: {}", e)),
            }
        }
    }
}

fn show_summary(session: &Session) {
    match session.summary() {
        Some(summary) => {
            Output::header("Summary");
            println!("{}\n", summary);
        }
        None => {
            if session.current().is_none() {
                Output::warning("No video loaded. Use: load <url|id>");
            } else {
                Output::warning("No content to summarize.");
            }
        }
    }
}

async fn ask_question(session: &Session, question: &str) {
    if session.current().is_none() {
        Output::warning("No video loaded. Use: load <url|id>");
        return;
    }

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
                println!();
            }
        }
        Err(e) if e.is_empty_content() => {
            spinner.finish_and_clear();
            Output::warning("No content to answer from.");
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
        }
    }
}

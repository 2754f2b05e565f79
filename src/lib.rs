//! Svar - YouTube Video Q&A
//!
//! An interactive tool for summarizing YouTube videos and asking questions
//! about their content.
//!
//! The name "Svar" comes from the Norwegian word for "answer."
//!
//! # Overview
//!
//! Svar lets you:
//! - Load any public YouTube video with captions
//! - Read an AI-generated summary of the video
//! - Ask questions and get answers grounded in the transcript, with
//!   timestamped sources
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `youtube` - Video ID parsing, transcript and metadata fetching
//! - `transcript` - Transcript data model
//! - `chunking` - Sliding-window transcript chunking
//! - `embedding` - Embedding generation
//! - `index` - In-memory vector index, rebuilt per loaded video
//! - `summarize` - Video summarization
//! - `rag` - Retrieval-augmented question answering
//! - `session` - Per-session pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::config::Settings;
//! use svar::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let mut session = Session::new(settings)?;
//!
//!     let result = session.load_video("dQw4w9WgXcQ").await?;
//!     println!("Indexed {} chunks", result.chunks_indexed);
//!
//!     let response = session.ask("What is this video about?").await?;
//!     println!("{}", response.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod openai;
pub mod rag;
pub mod session;
pub mod summarize;
pub mod transcript;
pub mod youtube;

pub use error::{Result, SvarError};

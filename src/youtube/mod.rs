//! YouTube access for Svar.
//!
//! Resolves user input (URL or bare ID) to a video ID, fetches caption
//! transcripts, and looks up video metadata.

mod client;

pub use client::YoutubeClient;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Metadata about a YouTube video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// 11-character video ID.
    pub video_id: String,
    /// Video title.
    pub title: String,
    /// Channel name (if available).
    pub channel: Option<String>,
    /// Video description (if available).
    pub description: Option<String>,
    /// Publication date (if available).
    pub published_at: Option<DateTime<Utc>>,
    /// Thumbnail URL (if available).
    pub thumbnail_url: Option<String>,
}

impl VideoMetadata {
    /// Placeholder metadata when no Data API key is configured or the
    /// lookup fails while captions are still available.
    pub fn untitled(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            title: video_id.to_string(),
            channel: None,
            description: None,
            published_at: None,
            thumbnail_url: None,
        }
    }

    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// Extract the 11-character video ID from a YouTube URL or bare ID.
pub fn parse_video_id(input: &str) -> Option<String> {
    // Matches common YouTube URL formats and bare video IDs
    let video_id_regex = Regex::new(
        r"(?x)
        (?:
            (?:https?://)?
            (?:www\.)?
            (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
            ([a-zA-Z0-9_-]{11})
        )
        |
        ^([a-zA-Z0-9_-]{11})$
    ",
    )
    .expect("valid regex");

    let caps = video_id_regex.captures(input.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Build a watch URL pointing at a specific second of a video.
pub fn url_with_timestamp(video_id: &str, seconds: f64) -> String {
    format!(
        "https://youtube.com/watch?v={}&t={}s",
        video_id, seconds as u32
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_id() {
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            parse_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            parse_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            parse_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );

        assert_eq!(parse_video_id("not-a-video-id"), None);
        assert_eq!(parse_video_id(""), None);
    }

    #[test]
    fn test_url_with_timestamp() {
        assert_eq!(
            url_with_timestamp("dQw4w9WgXcQ", 125.7),
            "https://youtube.com/watch?v=dQw4w9WgXcQ&t=125s"
        );
    }
}

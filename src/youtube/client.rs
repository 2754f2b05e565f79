//! YouTube transcript and metadata client.

use super::VideoMetadata;
use crate::config::YoutubeSettings;
use crate::error::{Result, SvarError};
use crate::transcript::{Transcript, TranscriptSegment};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};
use yt_transcript_rs::api::YouTubeTranscriptApi;

const DATA_API_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Client for fetching YouTube caption transcripts and video metadata.
pub struct YoutubeClient {
    transcript_api: YouTubeTranscriptApi,
    http: reqwest::Client,
    api_key: Option<String>,
    languages: Vec<String>,
}

impl YoutubeClient {
    /// Create a client from YouTube settings.
    pub fn new(settings: &YoutubeSettings) -> Result<Self> {
        let transcript_api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| SvarError::VideoSource(format!("transcript client init: {}", e)))?;

        Ok(Self {
            transcript_api,
            http: reqwest::Client::new(),
            api_key: settings.resolve_api_key(),
            languages: settings.languages.clone(),
        })
    }

    /// Whether metadata lookups are possible (a Data API key is configured).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch the caption transcript for a video.
    ///
    /// Tries the configured languages in order. Videos with captions
    /// disabled, age-restricted videos, and videos without a matching
    /// caption track all surface as `TranscriptUnavailable`.
    #[instrument(skip(self))]
    pub async fn fetch_transcript(&self, video_id: &str) -> Result<Transcript> {
        let languages: Vec<&str> = self.languages.iter().map(|s| s.as_str()).collect();

        let fetched = self
            .transcript_api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(|e| SvarError::TranscriptUnavailable(e.to_string()))?;

        debug!(
            "Fetched {} caption snippets ({})",
            fetched.snippets.len(),
            fetched.language_code
        );

        let segments: Vec<TranscriptSegment> = fetched
            .snippets
            .into_iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| {
                TranscriptSegment::new(
                    s.start,
                    s.start + s.duration,
                    s.text.replace('\n', " ").trim().to_string(),
                )
            })
            .collect();

        Ok(Transcript::new(video_id.to_string(), segments))
    }

    /// Fetch video metadata from the YouTube Data API.
    ///
    /// Returns `Ok(None)` when no API key is configured or the video has no
    /// snippet; callers degrade to captions-only in both cases.
    #[instrument(skip(self))]
    pub async fn fetch_metadata(&self, video_id: &str) -> Result<Option<VideoMetadata>> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };

        let response = self
            .http
            .get(DATA_API_URL)
            .query(&[("part", "snippet"), ("id", video_id), ("key", api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SvarError::VideoSource(format!(
                "YouTube Data API returned {}: {}",
                status, body
            )));
        }

        let listing: VideoListResponse = response.json().await?;

        let Some(item) = listing.items.into_iter().next() else {
            return Ok(None);
        };

        Ok(Some(item.snippet.into_metadata(video_id)))
    }
}

// === Data API response types ===

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    channel_title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    high: Option<Thumbnail>,
    #[serde(default)]
    medium: Option<Thumbnail>,
    #[serde(default)]
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl VideoSnippet {
    fn into_metadata(self, video_id: &str) -> VideoMetadata {
        let thumbnail_url = self.thumbnails.and_then(|t| {
            t.high
                .or(t.medium)
                .or(t.default)
                .map(|thumb| thumb.url)
        });

        VideoMetadata {
            video_id: video_id.to_string(),
            title: self.title,
            channel: self.channel_title,
            description: self.description.filter(|d| !d.is_empty()),
            published_at: self.published_at,
            thumbnail_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_deserialization() {
        let json = r#"{
            "items": [{
                "snippet": {
                    "title": "Test Video",
                    "channelTitle": "Test Channel",
                    "description": "A description",
                    "publishedAt": "2024-03-01T12:00:00Z",
                    "thumbnails": {
                        "medium": {"url": "https://i.ytimg.com/vi/x/mq.jpg"}
                    }
                }
            }]
        }"#;

        let listing: VideoListResponse = serde_json::from_str(json).unwrap();
        let metadata = listing
            .items
            .into_iter()
            .next()
            .unwrap()
            .snippet
            .into_metadata("dQw4w9WgXcQ");

        assert_eq!(metadata.title, "Test Video");
        assert_eq!(metadata.channel.as_deref(), Some("Test Channel"));
        assert_eq!(
            metadata.thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/x/mq.jpg")
        );
        assert!(metadata.published_at.is_some());
    }

    #[test]
    fn test_empty_listing() {
        let listing: VideoListResponse = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(listing.items.is_empty());
    }
}

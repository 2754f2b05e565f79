//! Transcript chunking for retrieval.
//!
//! Splits a transcript into overlapping sliding windows of words. Chunks
//! cover the full transcript with no gaps, and consecutive chunks share
//! exactly `chunk_overlap` words so that retrieval never loses context at
//! a boundary.

use crate::error::{Result, SvarError};
use crate::transcript::{format_timestamp, Transcript};
use serde::{Deserialize, Serialize};

/// A contiguous window of transcript text, the unit of retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Start time in seconds (start of the first source segment).
    pub start_seconds: f64,
    /// End time in seconds (end of the last source segment).
    pub end_seconds: f64,
    /// Index of the first source segment this chunk draws from.
    pub first_segment: usize,
    /// Index of the last source segment this chunk draws from.
    pub last_segment: usize,
    /// Order of this chunk in the transcript.
    pub order: i32,
}

impl ContentChunk {
    /// Number of whitespace-delimited words in this chunk.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Format the chunk start time for display.
    pub fn format_timestamp(&self) -> String {
        format_timestamp(self.start_seconds)
    }
}

/// Configuration for the sliding-window chunker. Sizes are in words.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    /// Words per chunk.
    pub chunk_size: usize,
    /// Words shared between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 200,
            chunk_overlap: 40,
        }
    }
}

impl ChunkingConfig {
    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(SvarError::InvalidInput(
                "chunk_size must be positive".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(SvarError::InvalidInput(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Split a transcript into overlapping word windows.
///
/// An empty transcript yields an empty sequence; a transcript shorter than
/// `chunk_size` yields exactly one chunk with the whole text.
pub fn chunk_transcript(transcript: &Transcript, config: &ChunkingConfig) -> Result<Vec<ContentChunk>> {
    config.validate()?;

    // Flatten segments into words, remembering each word's source segment.
    let mut words: Vec<&str> = Vec::new();
    let mut word_segment: Vec<usize> = Vec::new();
    for (seg_idx, segment) in transcript.segments.iter().enumerate() {
        for word in segment.text.split_whitespace() {
            words.push(word);
            word_segment.push(seg_idx);
        }
    }

    if words.is_empty() {
        return Ok(Vec::new());
    }

    let step = config.chunk_size - config.chunk_overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut order = 0i32;

    loop {
        let end = (start + config.chunk_size).min(words.len());

        let first_segment = word_segment[start];
        let last_segment = word_segment[end - 1];

        chunks.push(ContentChunk {
            content: words[start..end].join(" "),
            start_seconds: transcript.segments[first_segment].start_seconds,
            end_seconds: transcript.segments[last_segment].end_seconds,
            first_segment,
            last_segment,
            order,
        });
        order += 1;

        if end == words.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptSegment;

    fn transcript_of(words: &str) -> Transcript {
        Transcript::new(
            "test".to_string(),
            vec![TranscriptSegment::new(0.0, 10.0, words.to_string())],
        )
    }

    #[test]
    fn test_window_with_overlap() {
        let transcript = transcript_of("A B C D E F");
        let config = ChunkingConfig {
            chunk_size: 4,
            chunk_overlap: 2,
        };

        let chunks = chunk_transcript(&transcript, &config).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "A B C D");
        assert_eq!(chunks[1].content, "C D E F");
        assert_eq!(chunks[0].order, 0);
        assert_eq!(chunks[1].order, 1);
    }

    #[test]
    fn test_consecutive_chunks_share_exact_overlap() {
        let words: Vec<String> = (0..57).map(|i| format!("w{}", i)).collect();
        let transcript = transcript_of(&words.join(" "));
        let config = ChunkingConfig {
            chunk_size: 10,
            chunk_overlap: 3,
        };

        let chunks = chunk_transcript(&transcript, &config).unwrap();

        for pair in chunks.windows(2) {
            let prev: Vec<&str> = pair[0].content.split_whitespace().collect();
            let next: Vec<&str> = pair[1].content.split_whitespace().collect();
            // Trailing words of each chunk reappear at the head of the next.
            assert_eq!(&prev[prev.len() - 3..], &next[..3]);
        }
    }

    #[test]
    fn test_round_trip_reconstruction() {
        let words: Vec<String> = (0..113).map(|i| format!("w{}", i)).collect();
        let original = words.join(" ");
        let transcript = transcript_of(&original);

        for (size, overlap) in [(10, 3), (25, 5), (113, 20), (7, 0)] {
            let config = ChunkingConfig {
                chunk_size: size,
                chunk_overlap: overlap,
            };
            let chunks = chunk_transcript(&transcript, &config).unwrap();

            // Concatenating the non-overlapping portions reconstructs the
            // transcript exactly.
            let mut rebuilt: Vec<&str> = Vec::new();
            for (i, chunk) in chunks.iter().enumerate() {
                let chunk_words: Vec<&str> = chunk.content.split_whitespace().collect();
                let skip = if i == 0 { 0 } else { overlap };
                rebuilt.extend_from_slice(&chunk_words[skip..]);
            }
            assert_eq!(rebuilt.join(" "), original, "size={} overlap={}", size, overlap);
        }
    }

    #[test]
    fn test_short_transcript_single_chunk() {
        let transcript = transcript_of("only three words");
        let config = ChunkingConfig {
            chunk_size: 100,
            chunk_overlap: 10,
        };

        let chunks = chunk_transcript(&transcript, &config).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "only three words");
    }

    #[test]
    fn test_empty_transcript_yields_no_chunks() {
        let transcript = Transcript::new("test".to_string(), Vec::new());
        let chunks = chunk_transcript(&transcript, &ChunkingConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let transcript = transcript_of("some words here");

        let zero_size = ChunkingConfig {
            chunk_size: 0,
            chunk_overlap: 0,
        };
        assert!(chunk_transcript(&transcript, &zero_size).is_err());

        let overlap_too_big = ChunkingConfig {
            chunk_size: 5,
            chunk_overlap: 5,
        };
        assert!(chunk_transcript(&transcript, &overlap_too_big).is_err());
    }

    #[test]
    fn test_segment_range_and_timestamps() {
        let transcript = Transcript::new(
            "test".to_string(),
            vec![
                TranscriptSegment::new(0.0, 5.0, "one two three".to_string()),
                TranscriptSegment::new(5.0, 10.0, "four five six".to_string()),
                TranscriptSegment::new(10.0, 15.0, "seven eight nine".to_string()),
            ],
        );
        let config = ChunkingConfig {
            chunk_size: 4,
            chunk_overlap: 1,
        };

        let chunks = chunk_transcript(&transcript, &config).unwrap();

        // First window spans segments 0..=1 ("one two three four").
        assert_eq!(chunks[0].first_segment, 0);
        assert_eq!(chunks[0].last_segment, 1);
        assert_eq!(chunks[0].start_seconds, 0.0);
        assert_eq!(chunks[0].end_seconds, 10.0);

        // Last chunk ends at the final segment's end.
        let last = chunks.last().unwrap();
        assert_eq!(last.last_segment, 2);
        assert_eq!(last.end_seconds, 15.0);
    }
}

//! Content chunking for RAG retrieval.
//!
//! Splits extracted segments into overlapping windows measured in characters.
//! Each window records how many of its leading characters repeat the previous
//! window, so the non-overlapping cores of a segment's chunks concatenate back
//! to the segment text exactly.

use sift_core::{Chunk, Segment, SourceRef};
use tracing::warn;

/// Break points tried in order of preference. A window ends right after one.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum size of each chunk in characters.
    pub chunk_size: usize,
    /// Maximum number of characters shared with the previous chunk.
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkConfig {
    /// Create config from processing settings.
    pub fn from_processing_config(config: &sift_config::ProcessingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }

    fn normalized(self) -> Self {
        let chunk_size = self.chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: self.chunk_overlap.min(chunk_size - 1),
        }
    }
}

/// Content chunker for splitting segments.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    /// Create a chunker. An overlap that does not fit inside the chunk size is
    /// clamped to `chunk_size - 1`.
    pub fn new(config: ChunkConfig) -> Self {
        let normalized = config.normalized();
        if normalized != config {
            warn!(
                "Adjusted chunking from {}/{} to {}/{}",
                config.chunk_size,
                config.chunk_overlap,
                normalized.chunk_size,
                normalized.chunk_overlap
            );
        }
        Self { config: normalized }
    }

    pub fn config(&self) -> ChunkConfig {
        self.config
    }

    /// Split segments into chunks. Chunks never span segments; ordinals run
    /// across the whole input.
    pub fn split(&self, segments: &[Segment]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for segment in segments {
            if segment.text.trim().is_empty() {
                continue;
            }
            self.split_text(&segment.text, &segment.source, &mut chunks);
        }
        chunks
    }

    fn split_text(&self, text: &str, source: &SourceRef, out: &mut Vec<Chunk>) {
        let ChunkConfig {
            chunk_size: size,
            chunk_overlap: overlap,
        } = self.config;
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();

        let mut start = 0;
        let mut covered = 0;

        loop {
            let hard_end = (start + size).min(len);
            let end = if hard_end == len {
                len
            } else {
                let min_end = (start + size / 2)
                    .max(start + overlap + 1)
                    .max(covered + 1);
                find_break(&chars, start, min_end, hard_end).unwrap_or(hard_end)
            };

            let content: String = chars[start..end].iter().collect();
            out.push(Chunk::new(out.len(), content, source.clone()).with_overlap(covered - start));
            covered = end;

            if end == len {
                break;
            }

            let earliest = end.saturating_sub(overlap).max(start + 1);
            start = word_start(&chars, earliest, end).unwrap_or(earliest);
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}

/// Latest position in `min_end..=hard_end` that directly follows a separator,
/// trying separators in order of preference.
fn find_break(chars: &[char], start: usize, min_end: usize, hard_end: usize) -> Option<usize> {
    if min_end > hard_end {
        return None;
    }
    SEPARATORS.iter().find_map(|sep| {
        let sep: Vec<char> = sep.chars().collect();
        (min_end..=hard_end)
            .rev()
            .find(|&end| end >= start + sep.len() && chars[end - sep.len()..end] == sep[..])
    })
}

/// First position in `from..to` where a word begins.
fn word_start(chars: &[char], from: usize, to: usize) -> Option<usize> {
    (from..to).find(|&i| {
        !chars[i].is_whitespace() && (i == 0 || chars[i - 1].is_whitespace())
    })
}

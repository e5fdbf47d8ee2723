//! Audio file parser with transcription support.

use super::{ensure_exists, DocumentParser};
use crate::error::IngestResult;
use sift_core::{Segment, SourceRef};
use sift_process::Transcriber;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Parser for audio files. The transcript becomes one segment.
pub struct AudioParser {
    transcriber: Arc<dyn Transcriber>,
}

impl AudioParser {
    pub fn new(transcriber: Arc<dyn Transcriber>) -> Self {
        Self { transcriber }
    }

    /// Transcribe `audio` and attribute the text to `source`.
    ///
    /// The two differ when the audio was pulled out of a video.
    pub(crate) fn transcribe_as(&self, audio: &Path, source: &Path) -> IngestResult<Segment> {
        info!("Transcribing {:?} with {}", audio, self.transcriber.name());
        let transcript = self.transcriber.transcribe(audio)?;
        info!("Transcribed {} segments", transcript.segments.len());

        let metadata = serde_json::json!({
            "format": self.format(),
            "duration": transcript.duration(),
            "segment_count": transcript.segments.len(),
            "transcriber": self.transcriber.name(),
        });

        Ok(Segment::new(transcript.text(), SourceRef::new(source)).with_metadata(metadata))
    }
}

impl DocumentParser for AudioParser {
    fn parse(&self, path: &Path) -> IngestResult<Vec<Segment>> {
        ensure_exists(path)?;
        Ok(vec![self.transcribe_as(path, path)?])
    }

    fn format(&self) -> &'static str {
        "audio"
    }
}

//! Audio transcription.

use crate::error::{ProcessError, ProcessResult};
use crate::ffmpeg::require_tool;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;
use tracing::{debug, info};

/// A segment of transcribed audio.
#[derive(Debug, Clone)]
pub struct TranscriptSegment {
    /// The transcribed text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

/// A full transcript of one audio file.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    /// The transcript as a single block of text.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Duration covered by the transcript in seconds.
    pub fn duration(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }
}

/// Speech-to-text capability.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, audio_path: &Path) -> ProcessResult<Transcript>;

    /// Name for logging and metadata.
    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct WhisperJsonOutput {
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    text: String,
    start: f64,
    end: f64,
}

/// Transcriber backed by the `whisper` CLI (pip install openai-whisper).
#[derive(Debug, Clone)]
pub struct WhisperCli {
    /// Whisper model size (tiny, base, small, medium, large).
    model: String,
}

impl WhisperCli {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for WhisperCli {
    fn default() -> Self {
        Self::new("base")
    }
}

impl Transcriber for WhisperCli {
    fn transcribe(&self, audio_path: &Path) -> ProcessResult<Transcript> {
        if !audio_path.exists() {
            return Err(ProcessError::FileNotFound(audio_path.to_path_buf()));
        }
        require_tool("whisper")?;

        // Whisper writes its JSON next to a directory we own for this call only
        let output_dir = tempdir()?;

        info!("Transcribing {:?} with model '{}'", audio_path, self.model);

        let output = Command::new("whisper")
            .arg(audio_path)
            .args(["--model", &self.model])
            .args(["--output_format", "json"])
            .arg("--output_dir")
            .arg(output_dir.path())
            .output()?;

        if !output.status.success() {
            return Err(ProcessError::TranscriptionError(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        let stem = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        let json_path = output_dir.path().join(format!("{}.json", stem));

        if !json_path.exists() {
            return Err(ProcessError::TranscriptionError(
                "Whisper output file not found".to_string(),
            ));
        }

        let transcript = parse_whisper_json(&std::fs::read_to_string(&json_path)?)?;
        debug!("Transcribed {} segments", transcript.segments.len());
        Ok(transcript)
    }

    fn name(&self) -> &str {
        "whisper"
    }
}

fn parse_whisper_json(json: &str) -> ProcessResult<Transcript> {
    let whisper_output: WhisperJsonOutput = serde_json::from_str(json)
        .map_err(|e| ProcessError::ParseError(format!("Failed to parse Whisper output: {}", e)))?;

    Ok(Transcript::new(
        whisper_output
            .segments
            .into_iter()
            .map(|s| TranscriptSegment {
                text: s.text.trim().to_string(),
                start: s.start,
                end: s.end,
            })
            .collect(),
    ))
}

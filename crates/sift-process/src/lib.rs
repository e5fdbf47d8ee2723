//! Sift Process - Media processing for audio and video uploads.
//!
//! This crate provides:
//! - Audio track extraction from video (via FFmpeg CLI)
//! - Audio transcription (via Whisper CLI)
//!
//! These rely on external tools being installed on the system.

mod error;
mod ffmpeg;
mod transcribe;

pub use error::{ProcessError, ProcessResult};
pub use ffmpeg::{extract_audio, get_video_info, VideoInfo};
pub use transcribe::{Transcriber, Transcript, TranscriptSegment, WhisperCli};

/// Check if required external tools are available.
pub fn check_dependencies() -> Vec<(&'static str, bool)> {
    vec![
        ("ffmpeg", which::which("ffmpeg").is_ok()),
        ("ffprobe", which::which("ffprobe").is_ok()),
        ("whisper", which::which("whisper").is_ok()),
    ]
}

/// Check if all required tools are installed.
pub fn all_tools_available() -> bool {
    check_dependencies().iter().all(|(_, available)| *available)
}

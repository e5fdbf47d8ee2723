//! FFmpeg integration for pulling the audio track out of videos.

use crate::error::{ProcessError, ProcessResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Information about a video file.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    /// Duration in seconds.
    pub duration: f64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub fps: Option<f64>,
}

impl VideoInfo {
    pub fn has_audio(&self) -> bool {
        self.audio_codec.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

pub(crate) fn require_tool(tool: &str) -> ProcessResult<()> {
    which::which(tool)
        .map(|_| ())
        .map_err(|_| ProcessError::ToolNotFound {
            tool: tool.to_string(),
        })
}

/// Get information about a video file.
pub fn get_video_info(path: &Path) -> ProcessResult<VideoInfo> {
    if !path.exists() {
        return Err(ProcessError::FileNotFound(path.to_path_buf()));
    }
    require_tool("ffprobe")?;

    let output = Command::new("ffprobe")
        .args([
            "-v", "quiet",
            "-print_format", "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()?;

    if !output.status.success() {
        return Err(ProcessError::FfmpegError(
            String::from_utf8_lossy(&output.stderr).to_string(),
        ));
    }

    parse_probe(&String::from_utf8_lossy(&output.stdout))
}

fn parse_probe(json: &str) -> ProcessResult<VideoInfo> {
    let probe: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| ProcessError::ParseError(format!("Failed to parse ffprobe output: {}", e)))?;

    let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");
    let audio_stream = probe.streams.iter().find(|s| s.codec_type == "audio");

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let (width, height) = video_stream
        .map(|s| (s.width.unwrap_or(0), s.height.unwrap_or(0)))
        .unwrap_or((0, 0));

    Ok(VideoInfo {
        duration,
        width,
        height,
        video_codec: video_stream.and_then(|s| s.codec_name.clone()),
        audio_codec: audio_stream.and_then(|s| s.codec_name.clone()),
        fps: video_stream
            .and_then(|s| s.r_frame_rate.as_deref())
            .and_then(parse_frame_rate),
    })
}

/// Parse ffprobe's "num/den" frame rate notation.
fn parse_frame_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den > 0.0 {
                Some(num / den)
            } else {
                None
            }
        }
        None => rate.parse().ok(),
    }
}

/// Extract the audio track of a video into `output_dir`.
///
/// Returns the path to the extracted audio file (16kHz mono WAV). The caller
/// owns `output_dir` and with it the artifact's lifetime.
pub fn extract_audio(video_path: &Path, output_dir: &Path) -> ProcessResult<PathBuf> {
    if !video_path.exists() {
        return Err(ProcessError::FileNotFound(video_path.to_path_buf()));
    }
    require_tool("ffmpeg")?;

    let stem = video_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let audio_path = output_dir.join(format!("{}.wav", stem));

    info!("Extracting audio from {:?} to {:?}", video_path, audio_path);

    let output = Command::new("ffmpeg")
        .arg("-i")
        .arg(video_path)
        .args([
            "-vn",                   // No video
            "-acodec", "pcm_s16le",  // PCM audio
            "-ar", "16000",          // 16kHz sample rate (good for Whisper)
            "-ac", "1",              // Mono
            "-y",                    // Overwrite output
        ])
        .arg(&audio_path)
        .output()?;

    if !output.status.success() {
        return Err(ProcessError::FfmpegError(
            String::from_utf8_lossy(&output.stderr).to_string(),
        ));
    }

    debug!("Audio extracted successfully");
    Ok(audio_path)
}

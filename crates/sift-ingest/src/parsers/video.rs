//! Video file parser. Extracts the audio track and transcribes it.

use super::{ensure_exists, AudioParser, DocumentParser};
use crate::error::{IngestError, IngestResult};
use sift_core::Segment;
use sift_process::{extract_audio, get_video_info, Transcriber};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Parser for video files.
pub struct VideoParser {
    audio: AudioParser,
    /// Parent for the per-file working directory. System temp when unset.
    scratch_dir: Option<PathBuf>,
}

impl VideoParser {
    pub fn new(transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            audio: AudioParser::new(transcriber),
            scratch_dir: None,
        }
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    fn work_dir(&self) -> IngestResult<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("sift-video-");
        let dir = match &self.scratch_dir {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }
}

impl DocumentParser for VideoParser {
    fn parse(&self, path: &Path) -> IngestResult<Vec<Segment>> {
        ensure_exists(path)?;
        info!("Processing video: {:?}", path);

        let video_info = get_video_info(path).ok();
        if let Some(info) = &video_info {
            debug!(
                "Video info: {}x{}, {:.1}s duration",
                info.width, info.height, info.duration
            );
            if !info.has_audio() {
                return Err(IngestError::parse(path, "video has no audio track"));
            }
        }

        // The extracted track lives only as long as this directory.
        let work_dir = self.work_dir()?;
        let result = extract_audio(path, work_dir.path())
            .map_err(IngestError::from)
            .and_then(|audio| self.audio.transcribe_as(&audio, path));

        let dir_path = work_dir.path().to_path_buf();
        if let Err(e) = work_dir.close() {
            warn!("Failed to remove temporary directory {:?}: {}", dir_path, e);
        }

        let mut segment = result?;
        segment.metadata["format"] = serde_json::json!(self.format());
        if let Some(info) = video_info {
            segment.metadata["duration"] = serde_json::json!(info.duration);
            segment.metadata["width"] = serde_json::json!(info.width);
            segment.metadata["height"] = serde_json::json!(info.height);
            segment.metadata["video_codec"] = serde_json::json!(info.video_codec);
            segment.metadata["fps"] = serde_json::json!(info.fps);
        }

        Ok(vec![segment])
    }

    fn format(&self) -> &'static str {
        "video"
    }
}

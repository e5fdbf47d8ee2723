//! Error types for the ingestion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur while extracting a file.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Legacy .{legacy} files are not supported; save it as .{modern} and upload again")]
    LegacyFormat {
        legacy: &'static str,
        modern: &'static str,
    },

    #[error("Parse error for {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("File is not valid UTF-8 text: {0}")]
    InvalidUtf8(PathBuf),

    #[error("Media processing error: {0}")]
    Process(#[from] sift_process::ProcessError),
}

impl IngestError {
    pub(crate) fn parse(path: &std::path::Path, message: impl Into<String>) -> Self {
        IngestError::ParseError {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

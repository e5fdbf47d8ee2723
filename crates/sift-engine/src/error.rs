//! Engine error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] sift_config::ConfigError),

    #[error("Ollama error: {0}")]
    Ollama(#[from] sift_ollama::OllamaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type EngineResult<T> = Result<T, EngineError>;

//! Error types for sift.

use thiserror::Error;

/// Core error type shared by the provider interfaces.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),
}

/// Result type alias using sift's core Error.
pub type Result<T> = std::result::Result<T, Error>;

//! Index error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] sift_core::Error),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedder returned {actual} vectors for {expected} chunks")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Nothing to index")]
    NoChunks,
}

pub type IndexResult<T> = Result<T, IndexError>;

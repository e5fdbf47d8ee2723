//! Sift Ingest - Turns one uploaded file into retrievable chunks.
//!
//! This crate provides:
//! - Format-specific extraction (documents, spreadsheets, images, audio, video)
//! - Overlapping fixed-size chunking for embedding and retrieval

mod chunker;
mod error;
mod extractor;
mod parsers;

pub use chunker::{ChunkConfig, Chunker};
pub use error::{IngestError, IngestResult};
pub use extractor::Extractor;
pub use parsers::{image_placeholder, DocumentParser};

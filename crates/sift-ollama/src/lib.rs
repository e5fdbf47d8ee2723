//! Sift Ollama - Ollama integration for embeddings, chat and vision.
//!
//! This crate provides an async client for Ollama's HTTP API and adapters
//! that expose it through the provider traits in `sift-core`.

mod client;
mod error;
mod providers;
mod types;

pub use client::OllamaClient;
pub use error::{OllamaError, OllamaResult};
pub use providers::{OllamaChat, OllamaEmbedder, OllamaVision};
pub use types::*;

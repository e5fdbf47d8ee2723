//! Sift Core - Core types and provider interfaces for the sift assistant.

mod error;
pub mod providers;
mod types;

pub use error::{Error, Result};
pub use providers::{EmbeddingProvider, TextModel, VisionModel};
pub use types::*;

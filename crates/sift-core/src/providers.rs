//! Capability interfaces for the external model providers.
//!
//! The engine only talks to these traits; `sift-ollama` supplies the HTTP
//! implementations and tests supply deterministic ones.

use crate::error::Result;
use async_trait::async_trait;

/// Turns text into embedding vectors. Must be deterministic per model version.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    ///
    /// Default implementation calls `embed` sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Text-only completion model.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String>;

    fn name(&self) -> &str;
}

/// Completion model that accepts a single image alongside the prompt.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// `image` holds the raw file bytes; implementations encode as needed.
    async fn complete_with_image(&self, prompt: &str, image: &[u8]) -> Result<String>;

    fn name(&self) -> &str;
}

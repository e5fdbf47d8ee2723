//! Provider trait implementations backed by [`OllamaClient`].

use crate::client::OllamaClient;
use crate::types::{GenerateOptions, GenerateRequest};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sift_config::OllamaConfig;
use sift_core::{EmbeddingProvider, Error, Result, TextModel, VisionModel};

/// Embeddings from an Ollama embedding model.
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_config(client: OllamaClient, config: &OllamaConfig) -> Self {
        Self::new(client, &config.embedding_model)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client
            .embed(&self.model, text)
            .await
            .map_err(|e| Error::Embedding(e.to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.client
            .embed_batch(&self.model, texts)
            .await
            .map_err(|e| Error::Embedding(e.to_string()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Text completion through `/api/generate`.
pub struct OllamaChat {
    client: OllamaClient,
    model: String,
    temperature: f32,
}

impl OllamaChat {
    pub fn new(client: OllamaClient, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(client: OllamaClient, config: &OllamaConfig) -> Self {
        Self::new(client, &config.model, config.temperature)
    }

    pub(crate) fn request(&self, system: Option<&str>, prompt: &str) -> GenerateRequest {
        let request = GenerateRequest::new(&self.model, prompt)
            .with_options(GenerateOptions::new().with_temperature(self.temperature));
        match system {
            Some(system) => request.with_system(system),
            None => request,
        }
    }
}

#[async_trait]
impl TextModel for OllamaChat {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        let response = self
            .client
            .generate(self.request(system, prompt))
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;
        Ok(response.response.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Multimodal completion: the image travels base64-encoded with the prompt.
pub struct OllamaVision {
    client: OllamaClient,
    model: String,
    temperature: f32,
}

impl OllamaVision {
    pub fn new(client: OllamaClient, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(client: OllamaClient, config: &OllamaConfig) -> Self {
        Self::new(client, &config.vision_model, config.temperature)
    }

    pub(crate) fn request(&self, prompt: &str, image: &[u8]) -> GenerateRequest {
        GenerateRequest::new(&self.model, prompt)
            .with_images(vec![STANDARD.encode(image)])
            .with_options(GenerateOptions::new().with_temperature(self.temperature))
    }
}

#[async_trait]
impl VisionModel for OllamaVision {
    async fn complete_with_image(&self, prompt: &str, image: &[u8]) -> Result<String> {
        let response = self
            .client
            .generate(self.request(prompt, image))
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;
        Ok(response.response.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OllamaClient {
        OllamaClient::new("http://127.0.0.1:9").unwrap()
    }

    #[test]
    fn test_vision_request_encodes_image() {
        let vision = OllamaVision::new(client(), "llama3.2-vision", 0.0);
        let request = vision.request("What is shown?", b"hi");

        assert_eq!(request.model, "llama3.2-vision");
        assert_eq!(request.images, Some(vec!["aGk=".to_string()]));
        assert!(request.system.is_none());
        assert_eq!(request.options.and_then(|o| o.temperature), Some(0.0));
    }

    #[test]
    fn test_vision_request_uses_configured_temperature() {
        let config = OllamaConfig {
            temperature: 0.3,
            ..OllamaConfig::default()
        };
        let vision = OllamaVision::from_config(client(), &config);

        let request = vision.request("Describe it.", b"img");
        assert_eq!(request.model, config.vision_model);
        assert_eq!(request.options.and_then(|o| o.temperature), Some(0.3));
    }

    #[test]
    fn test_chat_request_carries_system_prompt() {
        let config = OllamaConfig::default();
        let chat = OllamaChat::from_config(client(), &config);

        let request = chat.request(Some("Answer from context."), "Question?");
        assert_eq!(request.model, config.model);
        assert_eq!(request.system.as_deref(), Some("Answer from context."));
        assert_eq!(request.options.and_then(|o| o.temperature), Some(0.0));
        assert!(chat.request(None, "Q").system.is_none());
    }

    #[tokio::test]
    async fn test_failures_map_to_core_errors() {
        let embedder = OllamaEmbedder::new(client(), "nomic-embed-text");
        assert!(matches!(
            embedder.embed("hello").await,
            Err(Error::Embedding(_))
        ));

        let chat = OllamaChat::new(client(), "gpt-oss:20b", 0.0);
        assert!(matches!(
            chat.complete(None, "hello").await,
            Err(Error::Generation(_))
        ));
    }
}

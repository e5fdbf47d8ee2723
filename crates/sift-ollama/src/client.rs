//! Ollama HTTP client.

use crate::error::{OllamaError, OllamaResult};
use crate::types::*;
use reqwest::{Client, RequestBuilder, Response};
use sift_config::OllamaConfig;
use std::time::Duration;
use tracing::debug;

/// Client for interacting with Ollama's API.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    host: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &OllamaConfig) -> OllamaResult<Self> {
        Self::with_timeout(&config.host, Duration::from_secs(config.timeout_seconds))
    }

    /// Create a new client with the default timeout.
    pub fn new(host: impl Into<String>) -> OllamaResult<Self> {
        Self::with_timeout(&host.into(), Duration::from_secs(120))
    }

    fn with_timeout(host: &str, timeout: Duration) -> OllamaResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(OllamaError::Http)?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Send a request, translating transport failures and error statuses.
    async fn send(&self, request: RequestBuilder, model: Option<&str>) -> OllamaResult<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                OllamaError::ServerNotRunning {
                    host: self.host.clone(),
                }
            } else if e.is_timeout() {
                OllamaError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            } else {
                OllamaError::Http(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        if let Some(model) = model {
            if text.contains("not found") || status.as_u16() == 404 {
                return Err(OllamaError::ModelNotFound {
                    model: model.to_string(),
                });
            }
        }

        Err(OllamaError::ApiError {
            status: status.as_u16(),
            message: text,
        })
    }

    /// Check if Ollama server is available.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.host);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// List all available models.
    pub async fn list_models(&self) -> OllamaResult<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.host);
        debug!("Listing models from {}", url);

        let response = self.send(self.client.get(&url), None).await?;
        let list: ListModelsResponse = response.json().await?;
        Ok(list.models)
    }

    /// Check if a specific model is available.
    pub async fn has_model(&self, model: &str) -> OllamaResult<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| model_matches(&m.name, model)))
    }

    /// Generate an embedding for text.
    pub async fn embed(&self, model: &str, text: &str) -> OllamaResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.host);
        debug!("Generating embedding with model {} for text length {}", model, text.len());

        let request = EmbeddingRequest {
            model: model.to_string(),
            prompt: text.to_string(),
        };

        let response = self
            .send(self.client.post(&url).json(&request), Some(model))
            .await?;
        let embedding_response: EmbeddingResponse = response.json().await?;

        if embedding_response.embedding.is_empty() {
            return Err(OllamaError::UnexpectedResponse(format!(
                "model {} returned an empty embedding",
                model
            )));
        }
        debug!("Generated embedding with {} dimensions", embedding_response.embedding.len());

        Ok(embedding_response.embedding)
    }

    /// Generate embeddings for multiple texts, one request each.
    pub async fn embed_batch(&self, model: &str, texts: &[String]) -> OllamaResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(model, text).await?);
        }
        Ok(embeddings)
    }

    /// Generate text (non-streaming).
    pub async fn generate(&self, mut request: GenerateRequest) -> OllamaResult<GenerateResponse> {
        let url = format!("{}/api/generate", self.host);
        debug!(
            "Generating with model {} ({} images)",
            request.model,
            request.images.as_ref().map(Vec::len).unwrap_or(0)
        );

        request.stream = false;
        let response = self
            .send(self.client.post(&url).json(&request), Some(&request.model))
            .await?;

        let generate_response: GenerateResponse = response.json().await?;
        Ok(generate_response)
    }
}

/// Whether an installed model name satisfies a requested one. A request
/// without a tag matches any tag of that model.
fn model_matches(installed: &str, requested: &str) -> bool {
    installed == requested
        || installed
            .strip_prefix(requested)
            .is_some_and(|rest| rest.starts_with(':'))
}

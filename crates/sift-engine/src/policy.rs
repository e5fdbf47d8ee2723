//! How an answer is produced from retrieved chunks and an optional image.

use crate::prompt;
use sift_core::{Chunk, TextModel, VisionModel};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Which branch a query takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    /// Nothing to ground an answer on.
    Refuse,
    /// Image plus whatever context was retrieved.
    Vision { image: &'a Path },
    /// Retrieved context only.
    Text,
}

/// Pick the branch. An image path that does not exist counts as no image.
pub fn decide<'a>(chunks: &[Chunk], image: Option<&'a Path>) -> Decision<'a> {
    match image {
        None if chunks.is_empty() => Decision::Refuse,
        Some(image) if image.exists() => Decision::Vision { image },
        _ => Decision::Text,
    }
}

/// How the final answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Refused,
    Vision,
    /// The vision model failed and the text model answered instead.
    VisionFallback,
    Text,
    /// Generation failed; the answer carries the error message.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub answer: String,
    pub route: Route,
}

impl Generation {
    fn new(answer: impl Into<String>, route: Route) -> Self {
        Self {
            answer: answer.into(),
            route,
        }
    }

    fn failed(error: impl std::fmt::Display) -> Self {
        Self::new(format!("Error: {}", error), Route::Failed)
    }
}

/// Grounded-answer-only generation over a text model and a vision model.
pub struct GenerationPolicy {
    text: Arc<dyn TextModel>,
    vision: Arc<dyn VisionModel>,
}

impl GenerationPolicy {
    pub fn new(text: Arc<dyn TextModel>, vision: Arc<dyn VisionModel>) -> Self {
        Self { text, vision }
    }

    /// Produce an answer. Never fails: errors become an `Error: ...` answer.
    pub async fn generate(
        &self,
        question: &str,
        chunks: &[Chunk],
        image: Option<&Path>,
    ) -> Generation {
        let decision = decide(chunks, image);
        debug!("Generating with {:?} from {} chunks", decision, chunks.len());

        let context = prompt::build_context(chunks);
        match decision {
            Decision::Refuse => Generation::new(prompt::REFUSAL, Route::Refused),
            Decision::Vision { image } => self.generate_with_image(question, &context, image).await,
            Decision::Text => {
                let prompt = prompt::text_prompt(&context, question);
                match self
                    .text
                    .complete(Some(prompt::TEXT_SYSTEM_PROMPT), &prompt)
                    .await
                {
                    Ok(answer) => Generation::new(answer, Route::Text),
                    Err(e) => Generation::failed(e),
                }
            }
        }
    }

    async fn generate_with_image(&self, question: &str, context: &str, image: &Path) -> Generation {
        let bytes = match tokio::fs::read(image).await {
            Ok(bytes) => bytes,
            Err(e) => return Generation::failed(e),
        };

        debug!("Using image {:?} with {}", image, self.vision.name());
        let prompt = prompt::vision_prompt(context, question);
        match self.vision.complete_with_image(&prompt, &bytes).await {
            Ok(answer) => Generation::new(answer, Route::Vision),
            Err(e) => {
                warn!(
                    "Vision model {} failed, falling back to {}: {}",
                    self.vision.name(),
                    self.text.name(),
                    e
                );
                let prompt = prompt::fallback_prompt(context, question);
                match self.text.complete(None, &prompt).await {
                    Ok(answer) => Generation::new(answer, Route::VisionFallback),
                    Err(e) => Generation::failed(e),
                }
            }
        }
    }
}

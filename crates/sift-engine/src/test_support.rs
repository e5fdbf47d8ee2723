//! Deterministic providers for engine tests.

use crate::prompt::CANNOT_FIND;
use async_trait::async_trait;
use sift_core::{EmbeddingProvider, Error, Result, TextModel, VisionModel};
use sift_process::{ProcessResult, Transcriber, Transcript, TranscriptSegment};
use std::path::Path;
use std::sync::Mutex;

const DIMENSIONS: usize = 64;

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf29ce484222325, |hash, b| {
        (hash ^ b as u64).wrapping_mul(0x100000001b3)
    })
}

/// Bag of lowercase words hashed into a fixed number of buckets.
#[derive(Default)]
pub struct HashingEmbedder {
    /// Queries containing this word fail.
    poison: Option<String>,
}

impl HashingEmbedder {
    pub fn poisoned(word: &str) -> Self {
        Self {
            poison: Some(word.to_string()),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.to_lowercase();
        if let Some(poison) = &self.poison {
            if text.contains(poison.as_str()) {
                return Err(Error::Embedding("embedding service unavailable".into()));
            }
        }

        let mut vector = vec![0.0; DIMENSIONS];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            vector[(fnv1a(word) % DIMENSIONS as u64) as usize] += 1.0;
        }
        Ok(vector)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

/// Answers "capital of X" questions from sentences of the form
/// "The capital of X is Y" found in the prompt, and otherwise gives the
/// fixed cannot-find answer. Records every call.
#[derive(Default)]
pub struct ScriptedText {
    failure: Option<String>,
    calls: Mutex<Vec<(Option<String>, String)>>,
}

impl ScriptedText {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// `(system, prompt)` pairs in call order.
    pub fn calls(&self) -> Vec<(Option<String>, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(prompt: &str) -> String {
        let question = prompt.rsplit("Question: ").next().unwrap_or_default();
        let subject = question
            .split("capital of ")
            .nth(1)
            .and_then(|rest| rest.split(|c: char| !c.is_alphanumeric()).next())
            .unwrap_or_default();
        if subject.is_empty() {
            return CANNOT_FIND.to_string();
        }

        let needle = format!("The capital of {} is ", subject);
        prompt
            .find(&needle)
            .and_then(|at| {
                prompt[at + needle.len()..]
                    .split(|c: char| !c.is_alphanumeric())
                    .next()
            })
            .map(str::to_string)
            .unwrap_or_else(|| CANNOT_FIND.to_string())
    }
}

#[async_trait]
impl TextModel for ScriptedText {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.map(str::to_string), prompt.to_string()));
        match &self.failure {
            Some(message) => Err(Error::Generation(message.clone())),
            None => Ok(Self::answer(prompt)),
        }
    }

    fn name(&self) -> &str {
        "scripted-text"
    }
}

/// Returns a fixed answer, or fails, and records every call.
pub struct ScriptedVision {
    answer: Option<String>,
    calls: Mutex<Vec<(String, Vec<u8>)>>,
}

impl ScriptedVision {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionModel for ScriptedVision {
    async fn complete_with_image(&self, prompt: &str, image: &[u8]) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), image.to_vec()));
        self.answer
            .clone()
            .ok_or_else(|| Error::Generation("vision model not available".into()))
    }

    fn name(&self) -> &str {
        "scripted-vision"
    }
}

/// Returns the same transcript for every file.
pub struct CannedTranscriber(pub &'static str);

impl Transcriber for CannedTranscriber {
    fn transcribe(&self, _audio_path: &Path) -> ProcessResult<Transcript> {
        Ok(Transcript::new(vec![TranscriptSegment {
            text: self.0.to_string(),
            start: 0.0,
            end: 3.0,
        }]))
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// Write a PDF with one page per entry, each page holding one line of text.
pub fn write_pdf(path: &Path, pages: &[&str]) {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

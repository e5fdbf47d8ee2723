//! The engine behind every transport: upload, ask, clear.

use crate::error::{EngineError, EngineResult};
use crate::policy::GenerationPolicy;
use crate::workflow::{QueryState, Workflow};
use crate::workspace::{CleanupFailure, Workspace};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sift_config::{AppPaths, Config};
use sift_core::{EmbeddingProvider, FileKind, TextModel, VisionModel};
use sift_index::{IndexId, IndexSummary, KnowledgeSession};
use sift_ingest::{ChunkConfig, Chunker, Extractor};
use sift_ollama::{OllamaChat, OllamaClient, OllamaEmbedder, OllamaVision};
use sift_process::{Transcriber, WhisperCli};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Settings the engine needs beyond its providers.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub chunking: ChunkConfig,
    pub top_k: usize,
    pub upload_dir: PathBuf,
    pub scratch_dir: PathBuf,
}

impl EngineOptions {
    pub fn from_config(config: &Config, paths: &AppPaths) -> Self {
        Self {
            chunking: ChunkConfig::from_processing_config(&config.processing),
            top_k: config.processing.top_k,
            upload_dir: config.upload_dir(paths),
            scratch_dir: config.scratch_dir(paths),
        }
    }
}

/// What a load left behind in the session.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Indexed { index_id: IndexId, chunks: usize },
    /// Nothing is loaded; the reason says why.
    Empty { reason: String },
}

/// Result of loading one file.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub path: PathBuf,
    pub kind: FileKind,
    /// SHA-256 of the file contents, hex encoded.
    pub content_hash: Option<String>,
    pub loaded_at: DateTime<Utc>,
    pub segments: usize,
    pub outcome: LoadOutcome,
}

impl LoadReport {
    fn empty(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: FileKind::from_path(path),
            content_hash: None,
            loaded_at: Utc::now(),
            segments: 0,
            outcome: LoadOutcome::Empty {
                reason: reason.into(),
            },
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.outcome, LoadOutcome::Indexed { .. })
    }

    pub fn chunks(&self) -> usize {
        match self.outcome {
            LoadOutcome::Indexed { chunks, .. } => chunks,
            LoadOutcome::Empty { .. } => 0,
        }
    }
}

/// Result of [`RagEngine::clear`].
#[derive(Debug, Clone, Default)]
pub struct ClearReport {
    /// Whether an index was active before the clear.
    pub index_dropped: bool,
    pub removed: Vec<PathBuf>,
    pub failures: Vec<CleanupFailure>,
}

/// Single-file grounded question answering.
///
/// Holds one [`KnowledgeSession`]; each upload replaces whatever the previous
/// one indexed.
pub struct RagEngine {
    session: KnowledgeSession,
    extractor: Arc<Extractor>,
    chunker: Chunker,
    policy: GenerationPolicy,
    workspace: Workspace,
}

impl RagEngine {
    /// Build an engine backed by Ollama and the Whisper CLI.
    pub fn from_config(config: &Config, paths: &AppPaths) -> EngineResult<Self> {
        config.validate()?;

        let client = OllamaClient::from_config(&config.ollama)?;
        let embedder = Arc::new(OllamaEmbedder::from_config(client.clone(), &config.ollama));
        let text = Arc::new(OllamaChat::from_config(client.clone(), &config.ollama));
        let vision = Arc::new(OllamaVision::from_config(client, &config.ollama));
        let transcriber = Arc::new(WhisperCli::new(config.processing.whisper_model.clone()));

        Ok(Self::new(
            embedder,
            text,
            vision,
            transcriber,
            EngineOptions::from_config(config, paths),
        ))
    }

    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        text: Arc<dyn TextModel>,
        vision: Arc<dyn VisionModel>,
        transcriber: Arc<dyn Transcriber>,
        options: EngineOptions,
    ) -> Self {
        debug!(
            "Engine using {} for embeddings, {} for text, {} for vision",
            embedder.name(),
            text.name(),
            vision.name()
        );
        let extractor = Extractor::new(transcriber).with_scratch_dir(&options.scratch_dir);

        Self {
            session: KnowledgeSession::new(embedder, options.top_k),
            extractor: Arc::new(extractor),
            chunker: Chunker::new(options.chunking),
            policy: GenerationPolicy::new(text, vision),
            workspace: Workspace::new(options.upload_dir, options.scratch_dir),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Index `path` as the only knowledge. Never fails: anything that stops
    /// the file from being indexed leaves the session empty and is reported
    /// in the outcome.
    pub async fn load(&self, path: &Path) -> LoadReport {
        if !path.is_file() {
            self.session.clear().await;
            warn!("Nothing to load at {:?}", path);
            return LoadReport::empty(path, "file not found");
        }

        let extractor = self.extractor.clone();
        let owned = path.to_path_buf();
        let extracted = tokio::task::spawn_blocking(move || {
            let segments = extractor.try_extract_path(&owned);
            (segments, hash_file(&owned))
        })
        .await;

        let (extraction, content_hash) = match extracted {
            Ok(result) => result,
            Err(e) => {
                self.session.clear().await;
                warn!("Extraction task for {:?} failed: {}", path, e);
                return LoadReport::empty(path, format!("extraction aborted: {}", e));
            }
        };

        let (segments, failure) = match extraction {
            Ok(segments) => (segments, None),
            Err(e) => {
                warn!("Extraction failed for {:?}: {}", path, e);
                (Vec::new(), Some(e.to_string()))
            }
        };

        let mut report = LoadReport::empty(path, "");
        report.content_hash = content_hash;
        report.segments = segments.len();

        let chunks = self.chunker.split(&segments);
        if chunks.is_empty() {
            self.session.clear().await;
            warn!("No text extracted from {:?}", path);
            report.outcome = LoadOutcome::Empty {
                reason: failure.unwrap_or_else(|| "no text could be extracted".to_string()),
            };
            return report;
        }

        debug!("Split {:?} into {} chunks", path, chunks.len());
        report.outcome = match self.session.load(chunks).await {
            Ok(summary) => {
                info!("Indexed {:?} as {}", path, summary.id);
                LoadOutcome::Indexed {
                    index_id: summary.id,
                    chunks: summary.chunks,
                }
            }
            Err(e) => {
                warn!("Indexing {:?} failed: {}", path, e);
                LoadOutcome::Empty {
                    reason: e.to_string(),
                }
            }
        };
        report
    }

    /// Make `source` the only knowledge: clear, copy it into the upload
    /// directory, then load the copy.
    pub async fn upload(&self, source: &Path) -> EngineResult<LoadReport> {
        if !source.is_file() {
            return Err(EngineError::FileNotFound(source.to_path_buf()));
        }

        let cleared = self.clear_keeping(&[source]).await;
        debug!(
            "Cleared before upload ({} files removed, {} failures)",
            cleared.removed.len(),
            cleared.failures.len()
        );

        let workspace = self.workspace.clone();
        let owned = source.to_path_buf();
        let staged = tokio::task::spawn_blocking(move || workspace.stage(&owned)).await??;

        Ok(self.load(&staged).await)
    }

    /// Copy an image into the upload directory for use with [`ask`](Self::ask).
    pub async fn stage_image(&self, source: &Path) -> EngineResult<PathBuf> {
        if !source.is_file() {
            return Err(EngineError::FileNotFound(source.to_path_buf()));
        }
        let workspace = self.workspace.clone();
        let owned = source.to_path_buf();
        Ok(tokio::task::spawn_blocking(move || workspace.stage(&owned)).await??)
    }

    /// Run the retrieve-then-generate pipeline and return its final state.
    pub async fn ask(&self, question: &str, image: Option<&Path>) -> QueryState {
        let state = QueryState::new(question, image.map(Path::to_path_buf));
        Workflow::new(&self.session, &self.policy).run(state).await
    }

    pub async fn query(&self, question: &str, image: Option<&Path>) -> String {
        self.ask(question, image).await.answer.unwrap_or_default()
    }

    /// Drop the active index and purge staged files and scratch space.
    /// Idempotent; cleanup failures are reported, not returned as errors.
    pub async fn clear(&self) -> ClearReport {
        self.clear_keeping(&[]).await
    }

    async fn clear_keeping(&self, keep: &[&Path]) -> ClearReport {
        let index_dropped = self.session.clear().await;
        let purge = self.workspace.purge_except(keep);
        ClearReport {
            index_dropped,
            removed: purge.removed,
            failures: purge.failures,
        }
    }

    pub async fn has_retriever(&self) -> bool {
        self.session.is_loaded().await
    }

    pub async fn summary(&self) -> Option<IndexSummary> {
        self.session.summary().await
    }
}

fn hash_file(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(content) => Some(format!("{:x}", Sha256::digest(&content))),
        Err(e) => {
            warn!("Could not hash {:?}: {}", path, e);
            None
        }
    }
}

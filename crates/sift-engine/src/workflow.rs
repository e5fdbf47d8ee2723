//! The retrieve-then-generate pipeline for a single query.

use crate::policy::{GenerationPolicy, Route};
use sift_core::Chunk;
use sift_index::KnowledgeSession;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Pipeline position. Always advances `Retrieve` → `Generate` → `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Retrieve,
    Generate,
    Done,
}

/// Everything one query carries through the pipeline.
#[derive(Debug, Clone)]
pub struct QueryState {
    pub question: String,
    pub image: Option<PathBuf>,
    pub chunks: Vec<Chunk>,
    pub answer: Option<String>,
    pub route: Option<Route>,
    stage: Stage,
}

impl QueryState {
    pub fn new(question: impl Into<String>, image: Option<PathBuf>) -> Self {
        Self {
            question: question.into(),
            image,
            chunks: Vec::new(),
            answer: None,
            route: None,
            stage: Stage::Retrieve,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }
}

pub(crate) struct Workflow<'a> {
    session: &'a KnowledgeSession,
    policy: &'a GenerationPolicy,
}

impl<'a> Workflow<'a> {
    pub(crate) fn new(session: &'a KnowledgeSession, policy: &'a GenerationPolicy) -> Self {
        Self { session, policy }
    }

    pub(crate) async fn run(&self, mut state: QueryState) -> QueryState {
        loop {
            match state.stage {
                Stage::Retrieve => {
                    self.retrieve(&mut state).await;
                    state.stage = Stage::Generate;
                }
                Stage::Generate => {
                    self.generate(&mut state).await;
                    state.stage = Stage::Done;
                }
                Stage::Done => return state,
            }
        }
    }

    /// Fill `state.chunks`. Failures leave it empty.
    async fn retrieve(&self, state: &mut QueryState) {
        let Some(retriever) = self.session.retriever().await else {
            debug!("No knowledge loaded");
            return;
        };

        match retriever.retrieve(&state.question).await {
            Ok(chunks) => {
                debug!(
                    "Retrieved {} chunks from index {}",
                    chunks.len(),
                    retriever.index_id()
                );
                state.chunks = chunks;
            }
            Err(e) => warn!("Retrieval failed, continuing without context: {}", e),
        }
    }

    async fn generate(&self, state: &mut QueryState) {
        let generation = self
            .policy
            .generate(&state.question, &state.chunks, state.image.as_deref())
            .await;
        state.answer = Some(generation.answer);
        state.route = Some(generation.route);
    }
}

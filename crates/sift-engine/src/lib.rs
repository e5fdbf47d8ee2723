//! Sift Engine - Answers questions about exactly one uploaded file.
//!
//! This crate provides:
//! - [`RagEngine`]: load, upload, query and clear over a [`KnowledgeSession`]
//! - The two-stage retrieve/generate workflow
//! - The generation policy (refusal, vision with text fallback, strict text)
//! - Best-effort cleanup of on-disk upload artifacts
//!
//! [`KnowledgeSession`]: sift_index::KnowledgeSession

mod engine;
mod error;
pub mod policy;
pub mod prompt;
mod workflow;
mod workspace;

#[cfg(test)]
mod test_support;

pub use engine::{ClearReport, EngineOptions, LoadOutcome, LoadReport, RagEngine};
pub use error::{EngineError, EngineResult};
pub use policy::{Decision, Generation, GenerationPolicy, Route};
pub use workflow::{QueryState, Stage};
pub use workspace::{CleanupFailure, PurgeReport, Workspace};

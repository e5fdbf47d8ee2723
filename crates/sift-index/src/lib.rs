//! Sift Index - Ephemeral vector storage for one upload at a time.
//!
//! An [`EphemeralIndex`] lives only in memory and is never reused. The
//! [`KnowledgeSession`] holds at most one of them and replaces it atomically
//! on every load.

mod error;
mod index;
mod session;
mod similarity;

pub use error::{IndexError, IndexResult};
pub use index::{EphemeralIndex, IndexId};
pub use session::{IndexSummary, KnowledgeSession, Retriever};
pub use similarity::{cosine_similarity, SimilarityResult};

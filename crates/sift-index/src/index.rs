//! In-memory vector collection for a single upload.

use crate::error::{IndexError, IndexResult};
use crate::similarity::{cosine_similarity, SimilarityResult};
use chrono::{DateTime, Utc};
use sift_core::{Chunk, EmbeddingProvider};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Identity of one index. Freshly generated for every build and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexId(Uuid);

impl IndexId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fresh_{}", self.0.simple())
    }
}

struct Entry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Embedded chunks held in memory. Dropping the index drops its vectors.
pub struct EphemeralIndex {
    id: IndexId,
    created_at: DateTime<Utc>,
    embedder: Arc<dyn EmbeddingProvider>,
    dimensions: Option<usize>,
    entries: Vec<Entry>,
}

impl EphemeralIndex {
    /// An empty index with a new identity.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            id: IndexId::fresh(),
            created_at: Utc::now(),
            embedder,
            dimensions: None,
            entries: Vec::new(),
        }
    }

    /// Create an index and embed every chunk into it.
    pub async fn build(chunks: Vec<Chunk>, embedder: Arc<dyn EmbeddingProvider>) -> IndexResult<Self> {
        let mut index = Self::new(embedder);
        index.add(chunks).await?;
        debug!(
            "Built index {} with {} chunks using {}",
            index.id,
            index.len(),
            index.embedder.name()
        );
        Ok(index)
    }

    pub fn id(&self) -> IndexId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed and store chunks. Nothing is stored if any embedding fails.
    pub async fn add(&mut self, chunks: Vec<Chunk>) -> IndexResult<()> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(IndexError::CountMismatch {
                expected: chunks.len(),
                actual: vectors.len(),
            });
        }

        let mut dimensions = self.dimensions;
        for vector in &vectors {
            match dimensions {
                Some(expected) if expected != vector.len() => {
                    return Err(IndexError::DimensionMismatch {
                        expected,
                        actual: vector.len(),
                    });
                }
                Some(_) => {}
                None => dimensions = Some(vector.len()),
            }
        }
        self.dimensions = dimensions;

        self.entries.extend(
            chunks
                .into_iter()
                .zip(vectors)
                .map(|(chunk, vector)| Entry { chunk, vector }),
        );
        Ok(())
    }

    /// Rank stored chunks against a query vector, most similar first. Equal
    /// scores keep chunk order.
    pub fn search(&self, query_vector: &[f32], k: usize) -> Vec<SimilarityResult> {
        let mut results: Vec<SimilarityResult> = self
            .entries
            .iter()
            .map(|entry| SimilarityResult {
                chunk: entry.chunk.clone(),
                similarity: cosine_similarity(query_vector, &entry.vector),
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then(a.chunk.ordinal.cmp(&b.chunk.ordinal))
        });
        results.truncate(k);
        results
    }

    /// Embed `text` and return the `k` nearest chunks.
    pub async fn query(&self, text: &str, k: usize) -> IndexResult<Vec<Chunk>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        let query_vector = self.embedder.embed(text).await?;
        Ok(self
            .search(&query_vector, k)
            .into_iter()
            .map(|result| result.chunk)
            .collect())
    }
}

impl fmt::Debug for EphemeralIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralIndex")
            .field("id", &self.id)
            .field("chunks", &self.entries.len())
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

//! The single active knowledge base.

use crate::error::{IndexError, IndexResult};
use crate::index::{EphemeralIndex, IndexId};
use chrono::{DateTime, Utc};
use sift_core::{Chunk, EmbeddingProvider};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tracing::{debug, info};

/// Description of the installed index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSummary {
    pub id: IndexId,
    pub chunks: usize,
    pub created_at: DateTime<Utc>,
}

impl IndexSummary {
    fn of(index: &EphemeralIndex) -> Self {
        Self {
            id: index.id(),
            chunks: index.len(),
            created_at: index.created_at(),
        }
    }
}

/// Holds at most one [`EphemeralIndex`].
///
/// `load` empties the slot before building the replacement, so between the
/// start of a load and its completion readers see no knowledge at all rather
/// than the previous upload. Writers are serialized.
pub struct KnowledgeSession {
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
    active: RwLock<Option<EphemeralIndex>>,
    writer: Mutex<()>,
}

impl KnowledgeSession {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self {
            embedder,
            top_k,
            active: RwLock::new(None),
            writer: Mutex::new(()),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Replace the active index with one built from `chunks`.
    ///
    /// The previous index is dropped first. If the build fails, or there is
    /// nothing to index, the session is left empty.
    pub async fn load(&self, chunks: Vec<Chunk>) -> IndexResult<IndexSummary> {
        let _writer = self.writer.lock().await;

        if let Some(old) = self.active.write().await.take() {
            debug!("Discarded index {}", old.id());
        }

        if chunks.is_empty() {
            return Err(IndexError::NoChunks);
        }

        let index = EphemeralIndex::build(chunks, self.embedder.clone()).await?;
        let summary = IndexSummary::of(&index);
        *self.active.write().await = Some(index);

        info!("Loaded index {} ({} chunks)", summary.id, summary.chunks);
        Ok(summary)
    }

    /// Drop the active index. Returns whether one was installed.
    pub async fn clear(&self) -> bool {
        let _writer = self.writer.lock().await;
        match self.active.write().await.take() {
            Some(old) => {
                info!("Cleared index {}", old.id());
                true
            }
            None => false,
        }
    }

    /// A retriever over the active index, or `None` when nothing is loaded.
    ///
    /// The retriever holds a read lock: a concurrent `load` or `clear` waits
    /// until it is dropped.
    pub async fn retriever(&self) -> Option<Retriever<'_>> {
        let guard = self.active.read().await;
        RwLockReadGuard::try_map(guard, |slot| slot.as_ref())
            .ok()
            .map(|index| Retriever {
                index,
                k: self.top_k,
            })
    }

    pub async fn is_loaded(&self) -> bool {
        self.active.read().await.is_some()
    }

    pub async fn active_id(&self) -> Option<IndexId> {
        self.active.read().await.as_ref().map(EphemeralIndex::id)
    }

    pub async fn summary(&self) -> Option<IndexSummary> {
        self.active.read().await.as_ref().map(IndexSummary::of)
    }
}

/// Nearest-neighbour lookups against one specific index.
pub struct Retriever<'a> {
    index: RwLockReadGuard<'a, EphemeralIndex>,
    k: usize,
}

impl Retriever<'_> {
    pub fn index_id(&self) -> IndexId {
        self.index.id()
    }

    /// The `k` chunks most similar to `question`.
    pub async fn retrieve(&self, question: &str) -> IndexResult<Vec<Chunk>> {
        self.index.query(question, self.k).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sift_core::{Result, SourceRef};
    use std::path::Path;
    use tokio::sync::Notify;

    /// Letter-frequency vectors; similar texts get similar vectors.
    struct LetterEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LetterEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.0; 26];
            for c in text.to_lowercase().chars().filter(char::is_ascii_lowercase) {
                v[(c as u8 - b'a') as usize] += 1.0;
            }
            Ok(v)
        }

        fn name(&self) -> &str {
            "letters"
        }
    }

    /// Blocks inside `embed` until released.
    struct GatedEmbedder {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl EmbeddingProvider for GatedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(vec![1.0, 0.0])
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(sift_core::Error::Embedding("model offline".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn chunks_from(file: &str, texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk::new(i, *t, SourceRef::new(Path::new(file))))
            .collect()
    }

    #[tokio::test]
    async fn test_second_load_replaces_first() {
        let session = KnowledgeSession::new(Arc::new(LetterEmbedder), 5);

        let first = session
            .load(chunks_from("a.txt", &["apples and apricots", "avocado salad"]))
            .await
            .unwrap();
        let second = session
            .load(chunks_from("b.txt", &["blueberries", "bananas in a bowl"]))
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(session.active_id().await, Some(second.id));

        let retriever = session.retriever().await.unwrap();
        let hits = retriever.retrieve("apples and apricots").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|c| c.source.path == "b.txt"));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let session = KnowledgeSession::new(Arc::new(LetterEmbedder), 5);
        assert!(!session.clear().await);

        session.load(chunks_from("a.txt", &["text"])).await.unwrap();
        assert!(session.is_loaded().await);

        assert!(session.clear().await);
        assert!(!session.clear().await);
        assert!(session.retriever().await.is_none());
        assert!(session.summary().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_load_leaves_session_empty() {
        let session = KnowledgeSession::new(Arc::new(LetterEmbedder), 5);
        session.load(chunks_from("a.txt", &["old"])).await.unwrap();

        assert!(matches!(
            session.load(Vec::new()).await,
            Err(IndexError::NoChunks)
        ));
        assert!(!session.is_loaded().await);

        let failing = KnowledgeSession::new(Arc::new(FailingEmbedder), 5);
        assert!(failing.load(chunks_from("a.txt", &["x"])).await.is_err());
        assert!(!failing.is_loaded().await);
    }

    #[tokio::test]
    async fn test_readers_see_nothing_while_loading() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let session = Arc::new(KnowledgeSession::new(
            Arc::new(GatedEmbedder {
                entered: entered.clone(),
                release: release.clone(),
            }),
            5,
        ));

        let loader = {
            let session = session.clone();
            tokio::spawn(async move { session.load(chunks_from("new.txt", &["fresh"])).await })
        };

        entered.notified().await;
        assert!(session.retriever().await.is_none());
        assert!(session.active_id().await.is_none());

        release.notify_one();
        let summary = loader.await.unwrap().unwrap();
        assert_eq!(session.active_id().await, Some(summary.id));
    }

    #[tokio::test]
    async fn test_retriever_limits_to_top_k() {
        let session = KnowledgeSession::new(Arc::new(LetterEmbedder), 2);
        session
            .load(chunks_from("a.txt", &["one", "two", "three", "four"]))
            .await
            .unwrap();

        let retriever = session.retriever().await.unwrap();
        assert_eq!(retriever.retrieve("two").await.unwrap().len(), 2);
        assert_eq!(Some(retriever.index_id()), session.active_id().await);
    }
}

//! The session slot: the one document currently being discussed.
//!
//! [`DocumentStore`] holds at most one [`Document`]. An upload replaces the
//! whole `{filename, text}` record in a single write, so a concurrent reader
//! sees either the previous document or the new one, never a mix of both.
//! Clones share the same slot.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// An uploaded document's extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub filename: String,
    pub text: String,
}

impl Document {
    /// `true` when extraction produced no text at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Single-slot, shared holder of the current [`Document`].
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    slot: Arc<RwLock<Option<Arc<Document>>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current document as one unit.
    pub async fn set_document(&self, filename: impl Into<String>, text: impl Into<String>) -> Arc<Document> {
        let doc = Arc::new(Document {
            filename: filename.into(),
            text: text.into(),
        });
        info!("Session document set: '{}' ({} chars)", doc.filename, doc.text.len());
        *self.slot.write().await = Some(Arc::clone(&doc));
        doc
    }

    /// The current document, if any.
    pub async fn get_document(&self) -> Option<Arc<Document>> {
        self.slot.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        assert!(DocumentStore::new().get_document().await.is_none());
    }

    #[tokio::test]
    async fn upload_replaces_wholesale() {
        let store = DocumentStore::new();
        store.set_document("a.pdf", "alpha").await;
        store.set_document("b.pdf", "beta").await;
        let doc = store.get_document().await.unwrap();
        assert_eq!(doc.filename, "b.pdf");
        assert_eq!(doc.text, "beta");
    }

    #[tokio::test]
    async fn clones_share_the_slot() {
        let store = DocumentStore::new();
        let other = store.clone();
        store.set_document("a.pdf", "alpha").await;
        assert_eq!(other.get_document().await.unwrap().filename, "a.pdf");
    }

    #[tokio::test]
    async fn readers_keep_their_snapshot() {
        let store = DocumentStore::new();
        store.set_document("old.pdf", "old").await;
        let held = store.get_document().await.unwrap();
        store.set_document("new.pdf", "new").await;
        assert_eq!(held.filename, "old.pdf");
        assert_eq!(held.text, "old");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_readers_never_see_a_mixed_pair() {
        let store = DocumentStore::new();
        store.set_document("f0.pdf", "t0").await;

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 1..200 {
                    store.set_document(format!("f{i}.pdf"), format!("t{i}")).await;
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let doc = store.get_document().await.unwrap();
                        let n = doc.filename.trim_start_matches('f').trim_end_matches(".pdf");
                        assert_eq!(doc.text, format!("t{n}"));
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for r in readers {
            r.await.unwrap();
        }
    }
}

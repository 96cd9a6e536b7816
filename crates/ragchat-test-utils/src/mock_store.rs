// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory document store and image index.

use std::cmp::Ordering;

use async_trait::async_trait;
use ragchat_core::{
    Document, DocumentStore, ImageEntry, ImageHit, ImageIndex, RagError, ScoredDocument,
    cosine_similarity,
};
use tokio::sync::RwLock;

/// A `DocumentStore` over a `Vec`, scored with the same cosine similarity
/// as the SQLite store.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        include_private: bool,
    ) -> Result<Vec<ScoredDocument>, RagError> {
        let documents = self.documents.read().await;
        let mut scored: Vec<ScoredDocument> = documents
            .iter()
            .filter(|d| include_private || !d.is_private())
            .map(|d| ScoredDocument {
                score: cosine_similarity(embedding, &d.embedding),
                document: d.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn save(&self, documents: Vec<Document>) -> Result<usize, RagError> {
        let mut stored = self.documents.write().await;
        let count = documents.len();
        for doc in documents {
            stored.retain(|d| d.id != doc.id);
            stored.push(doc);
        }
        Ok(count)
    }

    async fn count(&self) -> Result<usize, RagError> {
        Ok(self.documents.read().await.len())
    }
}

#[derive(Default)]
pub struct MemoryImageIndex {
    entries: RwLock<Vec<ImageEntry>>,
}

impl MemoryImageIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageIndex for MemoryImageIndex {
    async fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<ImageHit>, RagError> {
        let entries = self.entries.read().await;
        let mut hits: Vec<ImageHit> = entries
            .iter()
            .map(|e| ImageHit {
                describe: e.describe.clone(),
                score: cosine_similarity(embedding, &e.embedding),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }

    async fn save(&self, entries: Vec<ImageEntry>) -> Result<usize, RagError> {
        let mut stored = self.entries.write().await;
        let count = entries.len();
        for entry in entries {
            stored.retain(|e| e.id != entry.id);
            stored.push(entry);
        }
        Ok(count)
    }

    async fn count(&self) -> Result<usize, RagError> {
        Ok(self.entries.read().await.len())
    }
}

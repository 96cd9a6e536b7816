// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store traits for text documents and image descriptions.

use async_trait::async_trait;

use crate::error::RagError;
use crate::types::{Document, ImageEntry, ImageHit, ScoredDocument};

/// Similarity search over embedded text documents.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Returns up to `top_k` documents ranked by cosine similarity.
    ///
    /// Private documents are excluded unless `include_private` is set.
    /// An empty store yields an empty vector, not an error.
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        include_private: bool,
    ) -> Result<Vec<ScoredDocument>, RagError>;

    /// Inserts or replaces documents by id.
    async fn save(&self, documents: Vec<Document>) -> Result<usize, RagError>;

    /// Number of stored documents.
    async fn count(&self) -> Result<usize, RagError>;
}

/// Nearest-neighbour search over embedded images.
#[async_trait]
pub trait ImageIndex: Send + Sync + 'static {
    /// Returns up to `k` nearest entries, closest first.
    async fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<ImageHit>, RagError>;

    /// Inserts or replaces entries by id.
    async fn save(&self, entries: Vec<ImageEntry>) -> Result<usize, RagError>;

    /// Number of indexed images.
    async fn count(&self) -> Result<usize, RagError>;
}

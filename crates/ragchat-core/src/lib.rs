// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the ragchat backend.
//!
//! This crate provides the error taxonomy, the domain types shared by the
//! memory, retrieval, and agent crates, and the capability traits every
//! remote model adapter and vector store implements.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{BoxError, RagError};
pub use types::{
    AdapterType, ChatChunk, ChatMessage, ChatTurn, ConversationRequest, Document,
    HealthStatus, ImageAttachment, ImageEntry, ImageHit, Phase, RetrievalQuery, Role,
    ScoredDocument, Topic, UserHandle,
};

pub use traits::{
    ChunkStream, DocumentStore, ImageEmbedder, ImageIndex, ModelAdapter, TextEmbedder,
    TextGenerator, TopicClassifier,
};

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 { 0.0 } else { dot / denom }
}

// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapters for text and images.

use async_trait::async_trait;

use crate::error::RagError;
use crate::traits::adapter::ModelAdapter;
use crate::types::ImageAttachment;

/// Converts text into a dense vector for similarity search.
#[async_trait]
pub trait TextEmbedder: ModelAdapter {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, RagError>;
}

/// Converts an uploaded image into a dense vector for nearest-neighbour search.
#[async_trait]
pub trait ImageEmbedder: ModelAdapter {
    async fn embed_image(&self, image: &ImageAttachment) -> Result<Vec<f32>, RagError>;
}

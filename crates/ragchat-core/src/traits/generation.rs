// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming text generation.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::RagError;
use crate::traits::adapter::ModelAdapter;
use crate::types::ChatMessage;

/// A lazy, finite sequence of generated text chunks.
///
/// A mid-stream failure is delivered as one terminal `Err` item; chunks
/// yielded before it remain valid. Dropping the stream cancels generation.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, RagError>> + Send>>;

/// Adapter for a chat-completion endpoint that streams its output.
#[async_trait]
pub trait TextGenerator: ModelAdapter {
    /// Starts generating a reply to `messages`, capped at `max_tokens`.
    ///
    /// Errors returned here (rather than inside the stream) mean nothing was
    /// generated at all.
    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
    ) -> Result<ChunkStream, RagError>;
}

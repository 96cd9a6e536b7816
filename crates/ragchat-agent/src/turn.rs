// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The answer stream: GENERATE then PERSIST.

use std::sync::Arc;

use futures::StreamExt;
use ragchat_core::{ChatChunk, ChunkStream, Phase, RagError, Topic};
use ragchat_memory::MemoryService;
use tracing::{Span, debug, error, info, warn};

use crate::ChatStream;

/// Everything PERSIST needs once the answer is complete.
pub(crate) struct PreparedTurn {
    pub topics: Vec<Topic>,
    pub prompt: String,
}

/// Forward generator chunks to the caller, then write the turn to memory.
///
/// The first error item ends generation with a single `GenerationError`
/// chunk. Whatever text arrived before it is still persisted, but only once
/// the consumer polls again after the final chunk. Dropping the returned
/// stream before it yields `None` skips persistence.
pub(crate) fn answer_stream(
    turn: PreparedTurn,
    mut chunks: ChunkStream,
    memory: Arc<MemoryService>,
    span: Span,
) -> ChatStream {
    Box::pin(async_stream::stream! {
        let mut answer = String::new();

        while let Some(item) = chunks.next().await {
            match item {
                Ok(text) => {
                    if text.is_empty() {
                        continue;
                    }
                    answer.push_str(&text);
                    yield ChatChunk::Text(text);
                }
                Err(e) => {
                    let e = e.in_phase(Phase::Generate);
                    span.in_scope(|| {
                        warn!(
                            phase = %Phase::Generate,
                            error = %e,
                            partial_len = answer.len(),
                            "generation stopped early"
                        );
                    });
                    yield ChatChunk::GenerationError(e.cause().to_string());
                    break;
                }
            }
        }
        drop(chunks);

        match memory.remember(&turn.topics, &turn.prompt, &answer) {
            Ok(()) => span.in_scope(|| {
                debug!(topics = turn.topics.len(), answer_len = answer.len(), "turn persisted");
                info!("chat turn complete");
            }),
            Err(e) => {
                let e = RagError::Persistence {
                    message: "failed to remember turn".into(),
                    source: Some(Box::new(e)),
                }
                .in_phase(Phase::Persist);
                span.in_scope(|| {
                    error!(phase = %Phase::Persist, error = %e, "turn not persisted");
                });
                yield ChatChunk::PersistenceError(e.to_string());
            }
        }
    })
}

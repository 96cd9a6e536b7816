// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory service: summarized history and standing instructions.

use std::sync::Arc;

use futures::StreamExt;
use ragchat_context::render_summary;
use ragchat_core::{ChatMessage, RagError, TextGenerator, Topic};
use tracing::{debug, warn};

use crate::long_term::{InstructionSelector, LongTermMemory};
use crate::short_term::HistoryStore;

/// Composes both memories with the generator that writes history summaries.
pub struct MemoryService {
    short_term: Box<dyn HistoryStore>,
    long_term: LongTermMemory,
    generator: Arc<dyn TextGenerator>,
    summary_max_tokens: u32,
}

impl MemoryService {
    pub fn new(
        short_term: impl HistoryStore + 'static,
        long_term: LongTermMemory,
        generator: Arc<dyn TextGenerator>,
        summary_max_tokens: u32,
    ) -> Self {
        Self {
            short_term: Box::new(short_term),
            long_term,
            generator,
            summary_max_tokens,
        }
    }

    /// Summarize the history of `topics` with the generator.
    ///
    /// Returns `None` without calling the generator when those topics have
    /// no history. An error item in the summary stream fails the call.
    pub async fn get_chat_history(&self, topics: &[Topic]) -> Result<Option<String>, RagError> {
        let history = self.short_term.get(Some(topics))?;
        if history.is_empty() {
            debug!("no history for requested topics");
            return Ok(None);
        }

        let prompt = render_summary(&history);
        let mut stream = self
            .generator
            .generate(vec![ChatMessage::user(prompt)], self.summary_max_tokens)
            .await?;

        let mut summary = String::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => summary.push_str(&chunk),
                Err(e) => {
                    warn!(error = %e, "history summary interrupted");
                    return Err(match e {
                        RagError::Generation { .. } => e,
                        other => RagError::Generation {
                            message: "history summary interrupted".into(),
                            source: Some(Box::new(other)),
                        },
                    });
                }
            }
        }

        let summary = summary.trim().to_string();
        debug!(topics = history.len(), summary_len = summary.len(), "summarized history");
        Ok((!summary.is_empty()).then_some(summary))
    }

    /// Standing instructions, read fresh on each call.
    pub fn get_instruction(&self) -> Result<Vec<String>, RagError> {
        self.long_term.get()
    }

    pub fn remember(
        &self,
        topics: &[Topic],
        user_prompt: &str,
        bot_answer: &str,
    ) -> Result<(), RagError> {
        self.short_term.remember(topics, user_prompt, bot_answer)
    }

    pub fn add_instruction(&self, instruction: impl Into<String>) -> Result<(), RagError> {
        self.long_term.add(instruction)
    }

    pub fn delete_instruction(&self, selector: InstructionSelector) -> Result<String, RagError> {
        self.long_term.delete(selector)
    }

    pub fn short_term(&self) -> &dyn HistoryStore {
        self.short_term.as_ref()
    }

    pub fn long_term(&self) -> &LongTermMemory {
        &self.long_term
    }
}

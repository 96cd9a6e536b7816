// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Short-term history whose writes can be made to fail mid-test.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ragchat_core::{ChatTurn, RagError, Topic};
use ragchat_memory::{HistoryStore, ShortTermMemory};

/// Wraps [`ShortTermMemory`]; reads always pass through, writes fail while
/// the shared switch is on.
pub struct SwitchableHistory {
    inner: ShortTermMemory,
    fail_writes: Arc<AtomicBool>,
}

impl SwitchableHistory {
    pub fn new(inner: ShortTermMemory) -> Self {
        Self {
            inner,
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle that flips the switch after the store has been moved into
    /// a `MemoryService`.
    pub fn switch(&self) -> Arc<AtomicBool> {
        self.fail_writes.clone()
    }
}

impl HistoryStore for SwitchableHistory {
    fn remember(
        &self,
        topics: &[Topic],
        user_prompt: &str,
        bot_answer: &str,
    ) -> Result<(), RagError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RagError::Internal("history writes are disabled".into()));
        }
        self.inner.remember(topics, user_prompt, bot_answer)
    }

    fn get(&self, topics: Option<&[Topic]>) -> Result<BTreeMap<Topic, Vec<ChatTurn>>, RagError> {
        self.inner.get(topics)
    }
}

// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted text generator for deterministic tests.
//!
//! `MockGenerator` implements `TextGenerator` with pre-configured chunk
//! sequences, so pipeline tests never touch a model server.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream;
use ragchat_core::{
    AdapterType, ChatMessage, ChunkStream, HealthStatus, ModelAdapter, RagError, TextGenerator,
};
use tokio::sync::Mutex;

/// One step of a scripted generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Chunk(String),
    /// Ends the stream with a `Generation` error.
    Fail(String),
}

/// What one `generate` call does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    Stream(Vec<ScriptStep>),
    /// `generate` itself returns `BackendUnavailable`.
    Refuse(String),
}

impl Script {
    /// Streams `text` as a single chunk.
    pub fn text(text: impl Into<String>) -> Self {
        Script::Stream(vec![ScriptStep::Chunk(text.into())])
    }

    /// Streams each element as its own chunk.
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Script::Stream(chunks.into_iter().map(|c| ScriptStep::Chunk(c.into())).collect())
    }

    /// Streams `chunks`, then fails with `message`.
    pub fn fails_after<I, S>(chunks: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut steps: Vec<ScriptStep> =
            chunks.into_iter().map(|c| ScriptStep::Chunk(c.into())).collect();
        steps.push(ScriptStep::Fail(message.into()));
        Script::Stream(steps)
    }
}

/// A generator that replays queued scripts in FIFO order.
///
/// When the queue is empty a single "mock response" chunk is streamed.
pub struct MockGenerator {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    calls: AtomicUsize,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::with_scripts(Vec::new())
    }

    pub fn with_scripts(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(VecDeque::from(scripts))),
            requests: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self::with_scripts(responses.into_iter().map(Script::text).collect())
    }

    pub async fn push(&self, script: Script) {
        self.scripts.lock().await.push_back(script);
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Message lists received, in call order.
    pub async fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().await.clone()
    }

    pub async fn last_request(&self) -> Option<Vec<ChatMessage>> {
        self.requests.lock().await.last().cloned()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TextGeneration
    }

    async fn health_check(&self) -> Result<HealthStatus, RagError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        _max_tokens: u32,
    ) -> Result<ChunkStream, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(messages);

        let script = self
            .scripts
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Script::text("mock response"));

        let steps = match script {
            Script::Refuse(message) => return Err(RagError::unavailable("mock", message)),
            Script::Stream(steps) => steps,
        };
        let items: Vec<Result<String, RagError>> = steps
            .into_iter()
            .map(|step| match step {
                ScriptStep::Chunk(text) => Ok(text),
                ScriptStep::Fail(message) => Err(RagError::generation(message)),
            })
            .collect();
        Ok(Box::pin(stream::iter(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let generator = MockGenerator::new();
        let chunks: Vec<_> = generator
            .generate(vec![], 10)
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].as_ref().unwrap(), "mock response");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn failing_script_yields_error_last() {
        let generator =
            MockGenerator::with_scripts(vec![Script::fails_after(["a", "b"], "connection reset")]);
        let items: Vec<_> = generator
            .generate(vec![ChatMessage::user("q")], 10)
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok() && items[1].is_ok());
        assert!(matches!(items[2], Err(RagError::Generation { .. })));
        assert_eq!(generator.last_request().await.unwrap()[0].content, "q");
    }

    #[tokio::test]
    async fn refuse_fails_generate_itself() {
        let generator = MockGenerator::with_scripts(vec![Script::Refuse("down".into())]);
        assert!(matches!(
            generator.generate(vec![], 10).await,
            Err(RagError::BackendUnavailable { .. })
        ));
    }
}

// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline tests.
//!
//! `TestHarness` assembles a full [`Agent`] from mock adapters and either
//! in-memory stores or a temp SQLite database, then drives chat turns and
//! collects the streamed chunks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use ragchat_agent::{Agent, AgentSettings};
use ragchat_config::RagchatConfig;
use ragchat_context::PromptEngine;
use ragchat_core::{
    ChatChunk, ChatTurn, ConversationRequest, Document, DocumentStore, ImageEntry, ImageIndex,
    RagError, Topic,
};
use ragchat_memory::{LongTermMemory, MemoryService, ShortTermMemory};
use ragchat_retriever::{
    Database, ImageRetrieval, RetrieverService, SqliteDocumentStore, SqliteImageIndex,
};

use crate::mock_generator::{MockGenerator, Script};
use crate::mock_history::SwitchableHistory;
use crate::mock_models::{MOCK_DIMENSION, MockClassifier, MockEmbedder, MockImageEmbedder};
use crate::mock_store::{MemoryDocumentStore, MemoryImageIndex};

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    config: RagchatConfig,
    scripts: Vec<Script>,
    rules: Vec<(String, Topic)>,
    instructions: Vec<String>,
    documents: Vec<Document>,
    images: Vec<(Vec<u8>, String)>,
    sqlite: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: RagchatConfig::default(),
            scripts: Vec::new(),
            rules: Vec::new(),
            instructions: Vec::new(),
            documents: Vec::new(),
            images: Vec::new(),
            sqlite: false,
        }
    }

    /// Queue generator scripts. Summaries consume scripts too.
    pub fn with_scripts(mut self, scripts: Vec<Script>) -> Self {
        self.scripts.extend(scripts);
        self
    }

    pub fn with_responses(mut self, responses: Vec<&str>) -> Self {
        self.scripts.extend(responses.into_iter().map(Script::text));
        self
    }

    /// Classify sentences containing `keyword` as `topic`.
    pub fn with_rule(mut self, keyword: &str, topic: &str) -> Self {
        self.rules.push((keyword.to_string(), Topic::from(topic)));
        self
    }

    pub fn with_short_term_limit(mut self, limit: usize) -> Self {
        self.config.memory.short_term_limit = limit;
        self
    }

    pub fn with_instruction(mut self, instruction: &str) -> Self {
        self.instructions.push(instruction.to_string());
        self
    }

    pub fn with_greeting(mut self, greeting: &str) -> Self {
        self.config.agent.greeting = Some(greeting.to_string());
        self
    }

    pub fn with_text_top_k(mut self, top_k: usize) -> Self {
        self.config.retrieval.text_top_k = top_k;
        self
    }

    /// Add a public document; it is embedded at build time.
    pub fn with_document(mut self, id: &str, content: &str) -> Self {
        self.documents.push(Document {
            id: id.to_string(),
            content: content.to_string(),
            meta: serde_json::Map::new(),
            embedding: Vec::new(),
        });
        self
    }

    pub fn with_private_document(mut self, id: &str, content: &str) -> Self {
        let mut meta = serde_json::Map::new();
        meta.insert("privacy".into(), "1".into());
        self.documents.push(Document {
            id: id.to_string(),
            content: content.to_string(),
            meta,
            embedding: Vec::new(),
        });
        self
    }

    /// Index an image whose bytes are `bytes`, described as `describe`.
    pub fn with_image(mut self, bytes: &[u8], describe: &str) -> Self {
        self.images.push((bytes.to_vec(), describe.to_string()));
        self
    }

    /// Back the stores with a temp SQLite database instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    pub async fn build(self) -> Result<TestHarness, RagError> {
        let config = self.config;
        let vocabulary = config.topics.topics();

        let generator = Arc::new(MockGenerator::with_scripts(self.scripts));
        let embedder = Arc::new(MockEmbedder::new());
        let classifier = Arc::new(
            self.rules
                .into_iter()
                .fold(MockClassifier::new(vocabulary.clone()), |c, (k, t)| {
                    c.rule(&k, t)
                }),
        );

        let (documents, images, temp_dir) =
            if self.sqlite {
                let dir = tempfile::TempDir::new().map_err(|e| RagError::Storage {
                    source: Box::new(e),
                })?;
                let db = Database::open(dir.path().join("test.db")).await?;
                (
                    Arc::new(SqliteDocumentStore::new(db.clone(), MOCK_DIMENSION))
                        as Arc<dyn DocumentStore>,
                    Arc::new(SqliteImageIndex::new(db, MOCK_DIMENSION)) as Arc<dyn ImageIndex>,
                    Some(dir),
                )
            } else {
                (
                    Arc::new(MemoryDocumentStore::new()) as Arc<dyn DocumentStore>,
                    Arc::new(MemoryImageIndex::new()) as Arc<dyn ImageIndex>,
                    None,
                )
            };

        let entries: Vec<ImageEntry> = self
            .images
            .iter()
            .enumerate()
            .map(|(i, (bytes, describe))| ImageEntry {
                id: format!("img-{i}"),
                describe: describe.clone(),
                embedding: MockImageEmbedder::vector_for(bytes),
            })
            .collect();
        images.save(entries).await?;

        let retriever = RetrieverService::new(embedder.clone(), documents)
            .with_image(ImageRetrieval {
                embedder: Arc::new(MockImageEmbedder),
                index: images,
            })
            .with_top_k(config.retrieval.text_top_k, config.retrieval.image_top_k);
        retriever.ingest(self.documents).await?;

        let history = SwitchableHistory::new(ShortTermMemory::new(
            vocabulary,
            config.memory.short_term_limit,
        )?);
        let history_writes_fail = history.switch();
        let memory = MemoryService::new(
            history,
            LongTermMemory::with_instructions(self.instructions),
            generator.clone(),
            config.ollama.max_tokens,
        );

        let agent = Agent::new(
            classifier.clone(),
            generator.clone(),
            memory,
            retriever,
            PromptEngine::from_config(&config.agent),
            AgentSettings::from_config(&config),
        )
        .with_adapter(embedder.clone());

        Ok(TestHarness {
            agent: Arc::new(agent),
            generator,
            classifier,
            embedder,
            history_writes_fail,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired agent over mock adapters.
pub struct TestHarness {
    pub agent: Arc<Agent>,
    pub generator: Arc<MockGenerator>,
    pub classifier: Arc<MockClassifier>,
    pub embedder: Arc<MockEmbedder>,
    history_writes_fail: Arc<AtomicBool>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run a turn and collect every chunk, including error chunks.
    pub async fn chat(&self, request: ConversationRequest) -> Result<Vec<ChatChunk>, RagError> {
        let stream = self.agent.chat(request).await?;
        Ok(stream.collect().await)
    }

    /// Run a text-only turn and return the concatenated answer text.
    pub async fn ask(&self, prompt: &str) -> Result<String, RagError> {
        let chunks = self.chat(ConversationRequest::new(prompt)).await?;
        Ok(chunks.iter().filter_map(ChatChunk::as_text).collect())
    }

    /// Make every later short-term write fail (or succeed again).
    pub fn fail_history_writes(&self, fail: bool) {
        self.history_writes_fail.store(fail, Ordering::SeqCst);
    }

    /// Turns remembered under `topic`, oldest first.
    pub fn history(&self, topic: &str) -> Result<Vec<ChatTurn>, RagError> {
        let topic = Topic::from(topic);
        let mut map = self
            .agent
            .memory()
            .short_term()
            .get(Some(std::slice::from_ref(&topic)))?;
        Ok(map.remove(&topic).unwrap_or_default())
    }
}

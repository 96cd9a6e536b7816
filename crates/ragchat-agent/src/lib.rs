// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration.
//!
//! [`Agent::chat`] runs one turn through
//! `CLASSIFY -> RECALL -> RETRIEVE -> ASSEMBLE -> GENERATE -> PERSIST`.
//! The first four phases complete before `chat` returns, so their failures
//! surface as an `Err` tagged with the failing [`Phase`]. Generation and
//! persistence happen while the caller drains the returned [`ChatStream`].

pub mod settings;
mod turn;

use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use ragchat_context::{PromptAssembly, PromptEngine};
use ragchat_core::{
    AdapterType, ChatChunk, ConversationRequest, HealthStatus, ImageAttachment, ModelAdapter,
    Phase, RagError, RetrievalQuery, TextGenerator, Topic, TopicClassifier,
};
use ragchat_memory::{InstructionSelector, MemoryService};
use ragchat_retriever::RetrieverService;
use tracing::{Instrument, debug, error, info, info_span};

pub use settings::AgentSettings;
use turn::{PreparedTurn, answer_stream};

/// Chunks of one answer, in order.
///
/// The turn is written to short-term memory only after the last chunk, so
/// callers must poll until `None` for it to be remembered. That includes
/// polling past a `GenerationError`.
pub type ChatStream = Pin<Box<dyn Stream<Item = ChatChunk> + Send>>;

/// Health of one adapter as reported by [`Agent::health`].
#[derive(Debug, Clone)]
pub struct AdapterHealth {
    pub name: String,
    pub adapter_type: AdapterType,
    pub status: HealthStatus,
}

/// The chatbot. Shared across concurrent requests behind an `Arc`.
pub struct Agent {
    classifier: Arc<dyn TopicClassifier>,
    generator: Arc<dyn TextGenerator>,
    memory: Arc<MemoryService>,
    retriever: RetrieverService,
    prompts: PromptEngine,
    settings: AgentSettings,
    auxiliary: Vec<Arc<dyn ModelAdapter>>,
}

impl Agent {
    pub fn new(
        classifier: Arc<dyn TopicClassifier>,
        generator: Arc<dyn TextGenerator>,
        memory: MemoryService,
        retriever: RetrieverService,
        prompts: PromptEngine,
        settings: AgentSettings,
    ) -> Self {
        Self {
            classifier,
            generator,
            memory: Arc::new(memory),
            retriever,
            prompts,
            settings,
            auxiliary: Vec::new(),
        }
    }

    /// Register another adapter (an embedder, usually) for health checks.
    pub fn with_adapter(mut self, adapter: Arc<dyn ModelAdapter>) -> Self {
        self.auxiliary.push(adapter);
        self
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn memory(&self) -> &MemoryService {
        &self.memory
    }

    pub fn retriever(&self) -> &RetrieverService {
        &self.retriever
    }

    /// Run one chat turn.
    ///
    /// Returns once the prompt is assembled and generation has started.
    /// Drain the stream to completion; dropping it early skips PERSIST.
    pub async fn chat(&self, request: ConversationRequest) -> Result<ChatStream, RagError> {
        let span = info_span!(
            "chat",
            department = %request.user.department,
            username = %request.user.username,
        );

        let (turn, chunks) = self.begin(request).instrument(span.clone()).await?;
        Ok(answer_stream(turn, chunks, Arc::clone(&self.memory), span))
    }

    async fn begin(
        &self,
        request: ConversationRequest,
    ) -> Result<(PreparedTurn, ragchat_core::ChunkStream), RagError> {
        let ConversationRequest {
            prompt,
            attachment,
            greeting,
            ..
        } = request;

        let prompt = match (prompt.trim().is_empty(), &attachment) {
            (true, Some(_)) => self.settings.image_prompt.clone(),
            (true, None) => {
                return Err(RagError::InvalidArgument(
                    "prompt is empty and no image was attached".into(),
                ));
            }
            (false, _) => prompt,
        };
        info!(prompt_len = prompt.len(), image = attachment.is_some(), "chat turn started");

        // CLASSIFY
        let mut topics = self
            .classify(&prompt)
            .await
            .map_err(|e| fail(Phase::Classify, e))?;

        // RECALL
        let summary = self
            .memory
            .get_chat_history(&topics)
            .await
            .map_err(|e| fail(Phase::Recall, e))?;
        let instructions = self
            .memory
            .get_instruction()
            .map_err(|e| fail(Phase::Recall, e))?;

        // RETRIEVE
        let context = match attachment {
            Some(image) => {
                let (context, image_topics) = self
                    .retrieve_for_image(&prompt, image)
                    .await
                    .map_err(|e| fail(Phase::Retrieve, e))?;
                if let Some(image_topics) = image_topics {
                    topics = image_topics;
                }
                context
            }
            None => self
                .retriever
                .search(RetrievalQuery::Text(prompt.clone()))
                .await
                .map_err(|e| fail(Phase::Retrieve, e))?,
        };
        debug!(context = context.is_some(), history = summary.is_some(), "context gathered");

        // ASSEMBLE
        let assembly = PromptAssembly::new(prompt.as_str())
            .with_instructions(instructions)
            .with_summary(summary)
            .with_context(context);
        let greeting = greeting.or_else(|| self.settings.greeting.clone());
        let messages = self.prompts.build_messages(&assembly, greeting.as_deref());

        // GENERATE
        let chunks = self
            .generator
            .generate(messages, self.settings.max_tokens)
            .await
            .map_err(|e| fail(Phase::Generate, e))?;

        Ok((PreparedTurn { topics, prompt }, chunks))
    }

    async fn classify(&self, sentence: &str) -> Result<Vec<Topic>, RagError> {
        let topics = self
            .classifier
            .classify(sentence, self.settings.topic_top_k)
            .await
            .map_err(|e| match e {
                RagError::Classification { .. } => e,
                other => RagError::classification("topic classification failed", other),
            })?;
        debug!(topics = ?topics, "classified");
        Ok(topics)
    }

    /// Describe the image, file the description under its own topics, and
    /// retrieve text context for it.
    ///
    /// Returns the context plus the description's topics, or `None` topics
    /// when the index has no match (text retrieval then uses the prompt).
    async fn retrieve_for_image(
        &self,
        prompt: &str,
        image: ImageAttachment,
    ) -> Result<(Option<String>, Option<Vec<Topic>>), RagError> {
        let Some(description) = self.retriever.search(RetrievalQuery::Image(image)).await? else {
            debug!("no indexed image matched; retrieving with the prompt");
            let context = self
                .retriever
                .search(RetrievalQuery::Text(prompt.to_string()))
                .await?;
            return Ok((context, None));
        };

        let topics = self.classify(&description).await?;
        self.memory
            .remember(&topics, &self.settings.image_prompt, &description)?;
        let context = self
            .retriever
            .search(RetrievalQuery::Text(description))
            .await?;
        Ok((context, Some(topics)))
    }

    /// Append a standing instruction.
    pub fn add_instruction(&self, instruction: impl Into<String>) -> Result<(), RagError> {
        self.memory.add_instruction(instruction)
    }

    /// Remove a standing instruction by position or by exact text.
    pub fn delete_instruction(&self, selector: InstructionSelector) -> Result<String, RagError> {
        self.memory.delete_instruction(selector)
    }

    pub fn instructions(&self) -> Result<Vec<String>, RagError> {
        self.memory.get_instruction()
    }

    /// Pin the classifier and generator models in their runtimes.
    pub async fn start(&self) -> Result<(), RagError> {
        self.classifier.load().await?;
        self.generator.load().await?;
        for adapter in &self.auxiliary {
            adapter.load().await?;
        }
        info!(generator = self.generator.name(), "agent started");
        Ok(())
    }

    /// Release every model. Keeps going past failures and returns the first.
    pub async fn stop(&self) -> Result<(), RagError> {
        let mut first_err = None;
        for result in [self.generator.release().await, self.classifier.release().await] {
            if let Err(e) = result {
                error!(error = %e, "failed to release model");
                first_err.get_or_insert(e);
            }
        }
        for adapter in &self.auxiliary {
            if let Err(e) = adapter.release().await {
                error!(adapter = adapter.name(), error = %e, "failed to release model");
                first_err.get_or_insert(e);
            }
        }
        info!("agent stopped");
        first_err.map_or(Ok(()), Err)
    }

    /// Health of every adapter the agent talks to.
    pub async fn health(&self) -> Vec<AdapterHealth> {
        let mut report = Vec::with_capacity(self.auxiliary.len() + 2);
        report.push(probe(
            self.classifier.name(),
            self.classifier.adapter_type(),
            self.classifier.health_check().await,
        ));
        report.push(probe(
            self.generator.name(),
            self.generator.adapter_type(),
            self.generator.health_check().await,
        ));
        for adapter in &self.auxiliary {
            report.push(probe(
                adapter.name(),
                adapter.adapter_type(),
                adapter.health_check().await,
            ));
        }
        report
    }
}

fn probe(
    name: &str,
    adapter_type: AdapterType,
    result: Result<HealthStatus, RagError>,
) -> AdapterHealth {
    AdapterHealth {
        name: name.to_string(),
        adapter_type,
        status: result.unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string())),
    }
}

fn fail(phase: Phase, e: RagError) -> RagError {
    let e = e.in_phase(phase);
    error!(phase = %phase, error = %e, "chat phase failed");
    e
}

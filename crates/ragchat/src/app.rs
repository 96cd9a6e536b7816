// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires the configured adapters into an [`Agent`].

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use ragchat_agent::{Agent, AgentSettings};
use ragchat_config::RagchatConfig;
use ragchat_context::PromptEngine;
use ragchat_core::{ImageAttachment, RagError};
use ragchat_inference::{HttpImageEmbedder, HttpTopicClassifier};
use ragchat_memory::{LongTermMemory, MemoryService, ShortTermMemory};
use ragchat_ollama::{OllamaClient, OllamaEmbedder, OllamaGenerator};
use ragchat_retriever::{
    Database, ImageRetrieval, RetrieverService, SqliteDocumentStore, SqliteImageIndex,
};
use tracing::info;

/// A running chatbot plus the stores the CLI writes to directly.
pub struct App {
    pub agent: Arc<Agent>,
    pub documents: Arc<SqliteDocumentStore>,
    pub images: Arc<SqliteImageIndex>,
}

pub async fn build(config: &RagchatConfig) -> Result<App, RagError> {
    let ollama = OllamaClient::new(&config.ollama.base_url, &config.timeouts)?;
    if config.ollama.pull_on_start {
        ragchat_ollama::pull_models(&ollama, &config.ollama).await?;
    }

    let generator = Arc::new(OllamaGenerator::new(
        ollama.clone(),
        config.ollama.generation_model.as_str(),
    ));
    let embedder = Arc::new(OllamaEmbedder::new(
        ollama,
        config.ollama.embedding_model.as_str(),
    ));
    let classifier = Arc::new(HttpTopicClassifier::from_config(
        &config.inference,
        config.topics.topics(),
        &config.timeouts,
    )?);
    let image_embedder = Arc::new(HttpImageEmbedder::from_config(
        &config.inference,
        &config.timeouts,
    )?);

    let db = Database::open(&config.retrieval.database_path).await?;
    let documents = Arc::new(SqliteDocumentStore::new(
        db.clone(),
        config.retrieval.embedding_dimension,
    ));
    let images = Arc::new(SqliteImageIndex::new(db, config.retrieval.image_dimension));

    let retriever = RetrieverService::new(embedder.clone(), documents.clone())
        .with_image(ImageRetrieval {
            embedder: image_embedder.clone(),
            index: images.clone(),
        })
        .with_top_k(config.retrieval.text_top_k, config.retrieval.image_top_k);

    let memory = MemoryService::new(
        ShortTermMemory::new(config.topics.topics(), config.memory.short_term_limit)?,
        LongTermMemory::new(),
        generator.clone(),
        config.ollama.max_tokens,
    );

    let agent = Agent::new(
        classifier,
        generator,
        memory,
        retriever,
        PromptEngine::from_config(&config.agent),
        AgentSettings::from_config(config),
    )
    .with_adapter(embedder)
    .with_adapter(image_embedder);

    info!(
        name = %config.agent.name,
        database = %config.retrieval.database_path,
        "chatbot assembled"
    );
    Ok(App {
        agent: Arc::new(agent),
        documents,
        images,
    })
}

/// Read an image from disk, inferring its content type from the extension.
pub async fn load_image(path: &Path) -> Result<ImageAttachment, RagError> {
    let content_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => {
            return Err(RagError::InvalidArgument(format!(
                "{} is not a JPEG or PNG image",
                path.display()
            )));
        }
    };

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        RagError::InvalidArgument(format!("cannot read {}: {e}", path.display()))
    })?;
    let mut image = ImageAttachment::new(content_type, Bytes::from(bytes));
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        image = image.with_file_name(name);
    }
    Ok(image)
}

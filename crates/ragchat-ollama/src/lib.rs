// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama adapters for ragchat.
//!
//! [`OllamaGenerator`] streams chat completions from `/api/chat` as NDJSON
//! and pins its model with `keep_alive`. [`OllamaEmbedder`] calls
//! `/api/embed`. Both share one [`OllamaClient`].

pub mod client;
pub mod embedder;
pub mod generator;
pub mod ndjson;
pub mod types;

pub use client::OllamaClient;
pub use embedder::OllamaEmbedder;
pub use generator::OllamaGenerator;

use ragchat_config::model::OllamaConfig;
use ragchat_core::RagError;

/// Pull the generation and embedding models named in `config`.
pub async fn pull_models(client: &OllamaClient, config: &OllamaConfig) -> Result<(), RagError> {
    client.pull(&config.generation_model).await?;
    if config.embedding_model != config.generation_model {
        client.pull(&config.embedding_model).await?;
    }
    Ok(())
}

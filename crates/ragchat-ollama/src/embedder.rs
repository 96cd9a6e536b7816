// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text embeddings through `/api/embed`.

use async_trait::async_trait;
use ragchat_core::{AdapterType, HealthStatus, ModelAdapter, RagError, TextEmbedder};

use crate::client::OllamaClient;
use crate::generator::model_health;

pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ModelAdapter for OllamaEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TextEmbedding
    }

    async fn health_check(&self) -> Result<HealthStatus, RagError> {
        Ok(model_health(&self.client, &self.model).await)
    }
}

#[async_trait]
impl TextEmbedder for OllamaEmbedder {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.client.embed(&self.model, text).await
    }
}

// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming text generation through `/api/chat`.

use async_trait::async_trait;
use ragchat_core::{
    AdapterType, ChatMessage, ChunkStream, HealthStatus, ModelAdapter, RagError, TextGenerator,
};
use tracing::info;

use crate::client::OllamaClient;

/// Returns `Healthy` when `model` is among the runtime's local models.
pub(crate) async fn model_health(client: &OllamaClient, model: &str) -> HealthStatus {
    match client.list_models().await {
        Ok(models) if models.iter().any(|m| same_model(m, model)) => HealthStatus::Healthy,
        Ok(_) => HealthStatus::Degraded(format!("model `{model}` is not pulled")),
        Err(e) => HealthStatus::Unhealthy(e.to_string()),
    }
}

/// Ollama reports untagged models with an implicit `:latest`.
fn same_model(listed: &str, wanted: &str) -> bool {
    listed == wanted
        || listed.strip_suffix(":latest") == Some(wanted)
        || wanted.strip_suffix(":latest") == Some(listed)
}

pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
}

impl OllamaGenerator {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ModelAdapter for OllamaGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TextGeneration
    }

    async fn health_check(&self) -> Result<HealthStatus, RagError> {
        Ok(model_health(&self.client, &self.model).await)
    }

    async fn load(&self) -> Result<(), RagError> {
        self.client.keep_alive(&self.model, -1).await?;
        info!(model = %self.model, "generation model loaded");
        Ok(())
    }

    async fn release(&self) -> Result<(), RagError> {
        self.client.keep_alive(&self.model, 0).await?;
        info!(model = %self.model, "generation model released");
        Ok(())
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
    ) -> Result<ChunkStream, RagError> {
        self.client
            .chat_stream(&self.model, messages, max_tokens)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use ragchat_config::model::TimeoutConfig;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(server: &MockServer) -> OllamaGenerator {
        let client = OllamaClient::new(&server.uri(), &TimeoutConfig::default()).unwrap();
        OllamaGenerator::new(client, "llama3.1")
    }

    #[test]
    fn latest_tag_is_implicit() {
        assert!(same_model("llama3.1:latest", "llama3.1"));
        assert!(same_model("all-minilm:latest", "all-minilm:latest"));
        assert!(!same_model("llama3.1:8b", "llama3.1"));
    }

    #[tokio::test]
    async fn generate_streams_chat_chunks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3.1",
                "stream": true,
                "options": {"num_predict": 350}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/x-ndjson")
                    .set_body_string(
                        "{\"message\":{\"role\":\"assistant\",\"content\":\"It costs\"},\"done\":false}\n\
                         {\"message\":{\"role\":\"assistant\",\"content\":\" $10\"},\"done\":false}\n\
                         {\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
                    ),
            )
            .mount(&server)
            .await;

        let stream = generator(&server)
            .generate(vec![ChatMessage::user("What is the price of X?")], 350)
            .await
            .unwrap();
        let chunks: Vec<String> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks.concat(), "It costs $10");
    }

    #[tokio::test]
    async fn health_reflects_local_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "llama3.1:latest"}]
            })))
            .mount(&server)
            .await;

        let g = generator(&server);
        assert_eq!(g.health_check().await.unwrap(), HealthStatus::Healthy);

        let other = OllamaGenerator::new(
            OllamaClient::new(&server.uri(), &TimeoutConfig::default()).unwrap(),
            "mistral",
        );
        assert!(matches!(
            other.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }

    #[tokio::test]
    async fn load_and_release_toggle_keep_alive() {
        let server = MockServer::start().await;
        for keep_alive in [-1, 0] {
            Mock::given(method("POST"))
                .and(path("/api/generate"))
                .and(body_partial_json(
                    serde_json::json!({"model": "llama3.1", "keep_alive": keep_alive}),
                ))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({"done": true})),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let g = generator(&server);
        g.load().await.unwrap();
        g.release().await.unwrap();
    }
}

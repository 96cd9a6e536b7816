// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zero-shot topic classification over `POST /topic`.

use async_trait::async_trait;
use ragchat_config::model::{InferenceConfig, TimeoutConfig};
use ragchat_core::{AdapterType, HealthStatus, ModelAdapter, RagError, Topic, TopicClassifier};
use tracing::{debug, warn};

use crate::client::InferenceClient;
use crate::types::{TopicRequest, TopicResponse};

pub struct HttpTopicClassifier {
    client: InferenceClient,
    vocabulary: Vec<Topic>,
    labels: Vec<String>,
}

impl HttpTopicClassifier {
    pub fn new(client: InferenceClient, vocabulary: Vec<Topic>) -> Self {
        let labels = vocabulary.iter().map(|t| t.0.clone()).collect();
        Self {
            client,
            vocabulary,
            labels,
        }
    }

    pub fn from_config(
        config: &InferenceConfig,
        vocabulary: Vec<Topic>,
        timeouts: &TimeoutConfig,
    ) -> Result<Self, RagError> {
        let client = InferenceClient::new(
            "classifier",
            &config.base_url,
            config.classifier_model.clone(),
            timeouts,
        )?;
        Ok(Self::new(client, vocabulary))
    }
}

#[async_trait]
impl ModelAdapter for HttpTopicClassifier {
    fn name(&self) -> &str {
        self.client.model()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TopicClassification
    }

    async fn health_check(&self) -> Result<HealthStatus, RagError> {
        Ok(self.client.model_health().await)
    }
}

#[async_trait]
impl TopicClassifier for HttpTopicClassifier {
    async fn classify(&self, sentence: &str, top_k: usize) -> Result<Vec<Topic>, RagError> {
        let body = TopicRequest {
            topics: &self.labels,
            sentence,
            top_k,
        };
        let response: TopicResponse = self
            .client
            .send_json(self.client.post("/topic").json(&body))
            .await
            .map_err(|e| RagError::classification("topic service request failed", e))?;

        let mut topics: Vec<Topic> = Vec::with_capacity(response.topics.len());
        for label in response.topics {
            let topic = Topic(label);
            if !self.vocabulary.contains(&topic) {
                warn!(topic = %topic, "classifier returned a label outside the vocabulary");
                continue;
            }
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
        debug!(count = topics.len(), "classified prompt");
        Ok(topics)
    }

    fn vocabulary(&self) -> &[Topic] {
        &self.vocabulary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn vocabulary() -> Vec<Topic> {
        ["Product Information", "Pricing and Promotions", "Company Information"]
            .into_iter()
            .map(Topic::from)
            .collect()
    }

    fn classifier(server: &MockServer) -> HttpTopicClassifier {
        let client =
            InferenceClient::new("classifier", &server.uri(), "bart", &TimeoutConfig::default())
                .unwrap();
        HttpTopicClassifier::new(client, vocabulary())
    }

    #[tokio::test]
    async fn sends_vocabulary_and_returns_ranked_topics() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/topic"))
            .and(body_json(serde_json::json!({
                "topics": ["Product Information", "Pricing and Promotions", "Company Information"],
                "sentence": "What is the price of X?",
                "top_k": 1
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"topics": ["Pricing and Promotions"]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let topics = classifier(&server)
            .classify("What is the price of X?", 1)
            .await
            .unwrap();
        assert_eq!(topics, vec![Topic::from("Pricing and Promotions")]);
    }

    #[tokio::test]
    async fn drops_labels_outside_vocabulary() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/topic"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "topics": ["Weather", "Company Information", "Company Information"]
            })))
            .mount(&server)
            .await;

        let topics = classifier(&server).classify("Who are you?", 3).await.unwrap();
        assert_eq!(topics, vec![Topic::from("Company Information")]);
    }

    #[tokio::test]
    async fn server_error_is_classification_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/topic"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = classifier(&server).classify("hi", 3).await.unwrap_err();
        assert!(matches!(err, RagError::Classification { source: Some(_), .. }));
    }
}

// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the model-serving endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /topic`.
#[derive(Debug, Serialize)]
pub struct TopicRequest<'a> {
    pub topics: &'a [String],
    pub sentence: &'a str,
    pub top_k: usize,
}

/// Ranked labels, best first.
#[derive(Debug, Deserialize)]
pub struct TopicResponse {
    pub topics: Vec<String>,
}

/// Response of `POST /embed/image`.
#[derive(Debug, Deserialize)]
pub struct ImageVectorResponse {
    pub img_vector: Vec<f32>,
}

/// Response of `GET /model`.
#[derive(Debug, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub is_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_request_shape() {
        let topics = vec!["Pricing and Promotions".to_string()];
        let json = serde_json::to_value(TopicRequest {
            topics: &topics,
            sentence: "How much?",
            top_k: 3,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "topics": ["Pricing and Promotions"],
                "sentence": "How much?",
                "top_k": 3
            })
        );
    }

    #[test]
    fn model_info_defaults_to_not_loaded() {
        let info: ModelInfo = serde_json::from_str(r#"{"name":"bart"}"#).unwrap();
        assert_eq!(info.name, "bart");
        assert!(!info.is_loaded);
    }
}

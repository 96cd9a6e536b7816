// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Ollama native API.

use ragchat_core::ChatMessage;
use serde::{Deserialize, Serialize};

/// `POST /api/chat` request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub options: ChatOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatOptions {
    pub num_predict: u32,
}

/// One NDJSON line of a streamed chat response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseLine {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub done: bool,
    /// Set instead of `message` when the runtime fails mid-stream.
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: String,
}

/// `POST /api/embed` request body.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbedResponse {
    #[serde(default)]
    pub embeddings: Vec<Vec<f32>>,
}

/// `POST /api/generate` body that only changes how long a model stays loaded.
#[derive(Debug, Clone, Serialize)]
pub struct KeepAliveRequest<'a> {
    pub model: &'a str,
    /// `-1` keeps the model loaded indefinitely, `0` unloads it now.
    pub keep_alive: i64,
}

/// `POST /api/pull` request body.
#[derive(Debug, Clone, Serialize)]
pub struct PullRequest<'a> {
    pub model: &'a str,
    pub stream: bool,
}

/// One NDJSON progress line of a model pull.
#[derive(Debug, Clone, Deserialize)]
pub struct PullProgress {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/tags` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_shape() {
        let req = ChatRequest {
            model: "llama3.1".into(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            stream: true,
            options: ChatOptions { num_predict: 350 },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "llama3.1");
        assert_eq!(json["stream"], true);
        assert_eq!(json["options"]["num_predict"], 350);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn response_line_variants() {
        let chunk: ChatResponseLine =
            serde_json::from_str(r#"{"message":{"role":"assistant","content":"Hel"},"done":false}"#)
                .unwrap();
        assert_eq!(chunk.message.unwrap().content, "Hel");
        assert!(!chunk.done);

        let done: ChatResponseLine =
            serde_json::from_str(r#"{"done":true,"total_duration":12}"#).unwrap();
        assert!(done.done);

        let err: ChatResponseLine = serde_json::from_str(r#"{"error":"model crashed"}"#).unwrap();
        assert_eq!(err.error.as_deref(), Some("model crashed"));
    }
}

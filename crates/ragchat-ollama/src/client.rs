// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama native API.

use std::time::Duration;

use futures::StreamExt;
use ragchat_config::model::TimeoutConfig;
use ragchat_core::{ChatMessage, ChunkStream, RagError};
use serde::Serialize;
use tracing::{debug, info};

use crate::ndjson::{LineBuffer, chat_chunks};
use crate::types::{
    ApiError, ChatOptions, ChatRequest, EmbedRequest, EmbedResponse, KeepAliveRequest,
    PullProgress, PullRequest, TagsResponse,
};

const SERVICE: &str = "ollama";

/// Shared client for every Ollama endpoint the chatbot uses.
///
/// Unary calls are bounded by the request timeout. Chat streams are bounded
/// by the request timeout until headers arrive, then by the idle timeout
/// between chunks.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    stream_idle_timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeouts: &TimeoutConfig) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| RagError::BackendUnavailable {
                service: SERVICE.into(),
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: timeouts.request(),
            stream_idle_timeout: timeouts.stream_idle(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Start a streamed chat completion.
    pub async fn chat_stream(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
    ) -> Result<ChunkStream, RagError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            stream: true,
            options: ChatOptions {
                num_predict: max_tokens,
            },
        };

        let send = self.client.post(self.url("/api/chat")).json(&request).send();
        let response = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| RagError::Timeout {
                duration: self.request_timeout,
            })?
            .map_err(transport_err)?;
        let response = check_status(response).await?;

        debug!(model, "chat stream opened");
        Ok(chat_chunks(response.bytes_stream(), self.stream_idle_timeout))
    }

    /// Embed `input` and return the first vector.
    pub async fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, RagError> {
        let response: EmbedResponse = self
            .post_json("/api/embed", &EmbedRequest { model, input })
            .await?
            .json()
            .await
            .map_err(|e| RagError::BackendUnavailable {
                service: SERVICE.into(),
                message: format!("invalid embed response: {e}"),
                source: Some(Box::new(e)),
            })?;

        response
            .embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RagError::unavailable(SERVICE, "embed response contained no vectors"))
    }

    /// Set how long `model` stays resident: `-1` forever, `0` unload now.
    pub async fn keep_alive(&self, model: &str, keep_alive: i64) -> Result<(), RagError> {
        self.post_json("/api/generate", &KeepAliveRequest { model, keep_alive })
            .await?;
        debug!(model, keep_alive, "updated model keep-alive");
        Ok(())
    }

    /// Names of locally available models.
    pub async fn list_models(&self) -> Result<Vec<String>, RagError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(transport_err)?;
        let tags: TagsResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(transport_err)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Pull `model` from the registry, logging progress as it streams.
    ///
    /// Not bounded by the request timeout: downloads can take minutes. The
    /// idle timeout still applies between progress lines.
    pub async fn pull(&self, model: &str) -> Result<(), RagError> {
        info!(model, "pulling model");
        let response = self
            .client
            .post(self.url("/api/pull"))
            .json(&PullRequest { model, stream: true })
            .send()
            .await
            .map_err(transport_err)?;
        let response = check_status(response).await?;

        let mut body = response.bytes_stream();
        let mut lines = LineBuffer::default();
        let mut last_status = String::new();
        loop {
            let next = tokio::time::timeout(self.stream_idle_timeout, body.next())
                .await
                .map_err(|_| RagError::Timeout {
                    duration: self.stream_idle_timeout,
                })?;
            match next {
                Some(bytes) => lines.push(&bytes.map_err(transport_err)?),
                None => break,
            }
            while let Some(line) = lines.next_line() {
                let progress: PullProgress = serde_json::from_str(&line).map_err(|e| {
                    RagError::BackendUnavailable {
                        service: SERVICE.into(),
                        message: format!("invalid pull progress: {e}"),
                        source: Some(Box::new(e)),
                    }
                })?;
                if let Some(error) = progress.error {
                    return Err(RagError::unavailable(SERVICE, format!("pull failed: {error}")));
                }
                if progress.status != last_status {
                    debug!(
                        model,
                        status = %progress.status,
                        completed = progress.completed,
                        total = progress.total,
                        "pull progress"
                    );
                    last_status = progress.status;
                }
            }
        }
        info!(model, "model pull finished");
        Ok(())
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, RagError> {
        let response = self
            .client
            .post(self.url(path))
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await
            .map_err(transport_err)?;
        check_status(response).await
    }
}

fn transport_err(e: reqwest::Error) -> RagError {
    RagError::BackendUnavailable {
        service: SERVICE.into(),
        message: if e.is_timeout() {
            "request timed out".into()
        } else {
            format!("request failed: {e}")
        },
        source: Some(Box::new(e)),
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RagError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(RagError::unavailable(
        SERVICE,
        format!("returned {status}: {detail}"),
    ))
}

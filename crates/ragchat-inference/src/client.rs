// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared HTTP plumbing for the model servers.

use std::time::Duration;

use ragchat_config::model::TimeoutConfig;
use ragchat_core::{HealthStatus, RagError};
use serde::de::DeserializeOwned;

use crate::types::ModelInfo;

/// A client bound to one model server and the model it is expected to serve.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    service: &'static str,
    request_timeout: Duration,
}

impl InferenceClient {
    pub fn new(
        service: &'static str,
        base_url: &str,
        model: impl Into<String>,
        timeouts: &TimeoutConfig,
    ) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect())
            .timeout(timeouts.request())
            .build()
            .map_err(|e| RagError::BackendUnavailable {
                service: service.into(),
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            service,
            request_timeout: timeouts.request(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(format!("{}{path}", self.base_url))
    }

    /// Send `request` and decode a JSON body from a success response.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RagError> {
        let response = request.send().await.map_err(|e| self.transport_err(e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::unavailable(
                self.service,
                format!("HTTP {}: {}", status.as_u16(), body.trim()),
            ));
        }
        response.json().await.map_err(|e| RagError::BackendUnavailable {
            service: self.service.into(),
            message: format!("invalid response body: {e}"),
            source: Some(Box::new(e)),
        })
    }

    fn transport_err(&self, e: reqwest::Error) -> RagError {
        if e.is_timeout() {
            return RagError::Timeout {
                duration: self.request_timeout,
            };
        }
        RagError::BackendUnavailable {
            service: self.service.into(),
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    }

    /// Probe `GET /model`: healthy only when the expected model is loaded.
    pub async fn model_health(&self) -> HealthStatus {
        let request = self.client.get(format!("{}/model", self.base_url));
        match self.send_json::<ModelInfo>(request).await {
            Ok(info) if !info.is_loaded => {
                HealthStatus::Unhealthy(format!("model `{}` is not loaded", info.name))
            }
            Ok(info) if info.name != self.model => HealthStatus::Unhealthy(format!(
                "expected model `{}`, server reports `{}`",
                self.model, info.name
            )),
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }
}

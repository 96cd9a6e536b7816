// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image embeddings over multipart `POST /embed/image`.

use async_trait::async_trait;
use ragchat_config::model::{InferenceConfig, TimeoutConfig};
use ragchat_core::{
    AdapterType, HealthStatus, ImageAttachment, ImageEmbedder, ModelAdapter, RagError,
};
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::InferenceClient;
use crate::types::ImageVectorResponse;

pub struct HttpImageEmbedder {
    client: InferenceClient,
}

impl HttpImageEmbedder {
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }

    pub fn from_config(
        config: &InferenceConfig,
        timeouts: &TimeoutConfig,
    ) -> Result<Self, RagError> {
        let client = InferenceClient::new(
            "image-embedding",
            &config.image_base_url,
            config.image_model.clone(),
            timeouts,
        )?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ModelAdapter for HttpImageEmbedder {
    fn name(&self) -> &str {
        self.client.model()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ImageEmbedding
    }

    async fn health_check(&self) -> Result<HealthStatus, RagError> {
        Ok(self.client.model_health().await)
    }
}

#[async_trait]
impl ImageEmbedder for HttpImageEmbedder {
    async fn embed_image(&self, image: &ImageAttachment) -> Result<Vec<f32>, RagError> {
        let file_name = image.upload_name()?;
        let part = Part::bytes(image.bytes.to_vec())
            .file_name(file_name)
            .mime_str(&image.content_type)
            .map_err(|e| RagError::InvalidArgument(format!("bad image content type: {e}")))?;
        let form = Form::new().part("img", part);

        let response: ImageVectorResponse = self
            .client
            .send_json(self.client.post("/embed/image").multipart(form))
            .await?;
        if response.img_vector.is_empty() {
            return Err(RagError::unavailable(
                "image-embedding",
                "server returned an empty vector",
            ));
        }
        debug!(dimension = response.img_vector.len(), "embedded image");
        Ok(response.img_vector)
    }
}

// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retriever service: routes a query to the text store or the image index
//! and reduces the hits to a single context string.

use std::sync::Arc;

use ragchat_core::{
    Document, DocumentStore, ImageAttachment, ImageEmbedder, ImageIndex, RagError,
    RetrievalQuery, TextEmbedder,
};
use tracing::{debug, info};

/// Image-side collaborators. Optional: a text-only deployment has none.
pub struct ImageRetrieval {
    pub embedder: Arc<dyn ImageEmbedder>,
    pub index: Arc<dyn ImageIndex>,
}

pub struct RetrieverService {
    text_embedder: Arc<dyn TextEmbedder>,
    documents: Arc<dyn DocumentStore>,
    image: Option<ImageRetrieval>,
    text_top_k: usize,
    image_top_k: usize,
}

impl RetrieverService {
    pub fn new(text_embedder: Arc<dyn TextEmbedder>, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            text_embedder,
            documents,
            image: None,
            text_top_k: 2,
            image_top_k: 1,
        }
    }

    pub fn with_image(mut self, image: ImageRetrieval) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_top_k(mut self, text_top_k: usize, image_top_k: usize) -> Self {
        self.text_top_k = text_top_k.max(1);
        self.image_top_k = image_top_k.max(1);
        self
    }

    pub fn supports_images(&self) -> bool {
        self.image.is_some()
    }

    /// Resolve `query` to context text.
    ///
    /// `Ok(None)` means nothing matched. Backend failures are `Retrieval`
    /// errors; an unsupported attachment is `InvalidArgument`.
    pub async fn search(&self, query: RetrievalQuery) -> Result<Option<String>, RagError> {
        match query {
            RetrievalQuery::Text(text) => self.search_text(&text).await,
            RetrievalQuery::Image(image) => self.search_image(&image).await,
        }
    }

    /// Concatenation of every public document returned for `text`.
    pub async fn search_text(&self, text: &str) -> Result<Option<String>, RagError> {
        let embedding = self
            .text_embedder
            .embed_text(text)
            .await
            .map_err(|e| RagError::retrieval("text embedding failed", e))?;

        let hits = self
            .documents
            .search(&embedding, self.text_top_k, false)
            .await
            .map_err(|e| RagError::retrieval("document search failed", e))?;

        debug!(hits = hits.len(), "text retrieval");
        if hits.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            hits.into_iter()
                .map(|h| h.document.content)
                .collect::<String>(),
        ))
    }

    /// Description of the nearest indexed image.
    pub async fn search_image(&self, image: &ImageAttachment) -> Result<Option<String>, RagError> {
        image.extension()?;
        let retrieval = self.image.as_ref().ok_or_else(|| {
            RagError::InvalidArgument("image retrieval is not configured".into())
        })?;

        let embedding = retrieval
            .embedder
            .embed_image(image)
            .await
            .map_err(|e| RagError::retrieval("image embedding failed", e))?;

        let hits = retrieval
            .index
            .nearest(&embedding, self.image_top_k)
            .await
            .map_err(|e| RagError::retrieval("image search failed", e))?;

        debug!(hits = hits.len(), "image retrieval");
        Ok(hits.into_iter().next().map(|h| h.describe))
    }

    /// Embed documents that lack a vector and store them all.
    pub async fn ingest(&self, documents: Vec<Document>) -> Result<usize, RagError> {
        let mut prepared = Vec::with_capacity(documents.len());
        for mut doc in documents {
            if doc.id.is_empty() {
                doc.id = uuid::Uuid::new_v4().to_string();
            }
            if doc.embedding.is_empty() {
                doc.embedding = self.text_embedder.embed_text(&doc.content).await?;
            }
            prepared.push(doc);
        }
        let saved = self.documents.save(prepared).await?;
        info!(saved, "ingested documents");
        Ok(saved)
    }
}

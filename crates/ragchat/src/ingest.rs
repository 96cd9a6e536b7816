// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ragchat ingest` command implementation.
//!
//! Loads documents or pre-computed image vectors from a JSON array file.
//! Documents are embedded with the configured text model on the way in.

use std::path::Path;

use ragchat_core::{Document, ImageEntry, ImageIndex, RagError};
use serde::Deserialize;
use tracing::info;

use crate::app::App;

/// One element of a documents file. `id` may be omitted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentRecord {
    #[serde(default)]
    id: String,
    content: String,
    #[serde(default)]
    meta: serde_json::Map<String, serde_json::Value>,
}

async fn read_array<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, RagError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        RagError::InvalidArgument(format!("cannot read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        RagError::InvalidArgument(format!("{} is not a valid JSON array: {e}", path.display()))
    })
}

pub async fn ingest_documents(app: &App, path: &Path) -> Result<usize, RagError> {
    let records: Vec<DocumentRecord> = read_array(path).await?;
    let documents: Vec<Document> = records
        .into_iter()
        .map(|r| Document {
            id: r.id,
            content: r.content,
            meta: r.meta,
            embedding: Vec::new(),
        })
        .collect();

    let count = app.agent.retriever().ingest(documents).await?;
    info!(count, file = %path.display(), "documents ingested");
    Ok(count)
}

pub async fn ingest_images(app: &App, path: &Path) -> Result<usize, RagError> {
    let entries: Vec<ImageEntry> = read_array(path).await?;
    if let Some(bad) = entries.iter().find(|e| e.embedding.is_empty()) {
        return Err(RagError::InvalidArgument(format!(
            "image `{}` has an empty embedding",
            bad.id
        )));
    }

    let count = app.images.save(entries).await?;
    info!(count, file = %path.display(), "image vectors ingested");
    Ok(count)
}

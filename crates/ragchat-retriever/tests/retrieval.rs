// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retriever service routing against in-memory SQLite stores.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ragchat_core::{
    AdapterType, Document, DocumentStore, HealthStatus, ImageAttachment, ImageEmbedder,
    ImageEntry, ImageIndex, ModelAdapter, RagError, RetrievalQuery, TextEmbedder,
};
use ragchat_retriever::{
    Database, ImageRetrieval, RetrieverService, SqliteDocumentStore, SqliteImageIndex,
};

/// Looks texts up in a fixed table; unknown text is a backend failure.
struct TableEmbedder(HashMap<String, Vec<f32>>);

#[async_trait]
impl ModelAdapter for TableEmbedder {
    fn name(&self) -> &str {
        "table"
    }
    fn adapter_type(&self) -> AdapterType {
        AdapterType::TextEmbedding
    }
    async fn health_check(&self) -> Result<HealthStatus, RagError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl TextEmbedder for TableEmbedder {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.0
            .get(text)
            .cloned()
            .ok_or_else(|| RagError::unavailable("embedder", "no vector for text"))
    }
}

/// Embeds every image as its first two bytes.
struct ByteImageEmbedder;

#[async_trait]
impl ModelAdapter for ByteImageEmbedder {
    fn name(&self) -> &str {
        "bytes"
    }
    fn adapter_type(&self) -> AdapterType {
        AdapterType::ImageEmbedding
    }
    async fn health_check(&self) -> Result<HealthStatus, RagError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ImageEmbedder for ByteImageEmbedder {
    async fn embed_image(&self, image: &ImageAttachment) -> Result<Vec<f32>, RagError> {
        Ok(image.bytes.iter().take(2).map(|b| f32::from(*b)).collect())
    }
}

fn embedder() -> Arc<TableEmbedder> {
    let mut table = HashMap::new();
    table.insert("price of 3TE7".to_string(), vec![1.0, 0.0, 0.0]);
    table.insert("3TE7 costs $10. ".to_string(), vec![0.9, 0.1, 0.0]);
    table.insert("Promotions end Friday.".to_string(), vec![0.8, 0.2, 0.0]);
    table.insert("SSD".to_string(), vec![0.0, 1.0, 0.0]);
    Arc::new(TableEmbedder(table))
}

async fn service() -> (RetrieverService, Arc<SqliteDocumentStore>, Arc<SqliteImageIndex>) {
    let db = Database::open_in_memory().await.unwrap();
    let documents = Arc::new(SqliteDocumentStore::new(db.clone(), 3));
    let images = Arc::new(SqliteImageIndex::new(db, 2));
    let svc = RetrieverService::new(embedder(), documents.clone())
        .with_top_k(2, 1)
        .with_image(ImageRetrieval {
            embedder: Arc::new(ByteImageEmbedder),
            index: images.clone(),
        });
    (svc, documents, images)
}

fn public(content: &str) -> Document {
    Document {
        id: String::new(),
        content: content.into(),
        meta: serde_json::Map::new(),
        embedding: Vec::new(),
    }
}

#[tokio::test]
async fn empty_text_store_is_absent_not_error() {
    let (svc, _, _) = service().await;
    let result = svc
        .search(RetrievalQuery::Text("price of 3TE7".into()))
        .await
        .unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn text_hits_are_concatenated_without_separator() {
    let (svc, documents, _) = service().await;
    let saved = svc
        .ingest(vec![public("3TE7 costs $10. "), public("Promotions end Friday.")])
        .await
        .unwrap();
    assert_eq!(saved, 2);
    assert_eq!(documents.count().await.unwrap(), 2);

    let result = svc.search_text("price of 3TE7").await.unwrap();
    assert_eq!(
        result.as_deref(),
        Some("3TE7 costs $10. Promotions end Friday.")
    );
}

#[tokio::test]
async fn private_documents_are_never_returned() {
    let (svc, documents, _) = service().await;
    let mut secret = public("internal margin 40%");
    secret.id = "secret".into();
    secret.embedding = vec![1.0, 0.0, 0.0];
    secret
        .meta
        .insert("privacy".into(), serde_json::json!("1"));
    documents.save(vec![secret]).await.unwrap();

    assert_eq!(svc.search_text("price of 3TE7").await.unwrap(), None);
}

#[tokio::test]
async fn embedding_failure_is_retrieval_error() {
    let (svc, _, _) = service().await;
    let err = svc.search_text("unknown text").await.unwrap_err();
    assert!(matches!(err, RagError::Retrieval { .. }), "got {err:?}");
}

#[tokio::test]
async fn image_query_returns_nearest_description() {
    let (svc, _, images) = service().await;
    let png = ImageAttachment::new("image/png", vec![10u8, 0, 99]);
    assert_eq!(
        svc.search(RetrievalQuery::Image(png.clone())).await.unwrap(),
        None
    );

    images
        .save(vec![
            ImageEntry {
                id: "a".into(),
                describe: "This is the 3ME3 SSD".into(),
                embedding: vec![10.0, 0.0],
            },
            ImageEntry {
                id: "b".into(),
                describe: "This is the 3TE7 SSD".into(),
                embedding: vec![0.0, 10.0],
            },
        ])
        .await
        .unwrap();

    let described = svc.search(RetrievalQuery::Image(png)).await.unwrap();
    assert_eq!(described.as_deref(), Some("This is the 3ME3 SSD"));
}

#[tokio::test]
async fn unsupported_image_type_is_invalid_argument() {
    let (svc, _, _) = service().await;
    let gif = ImageAttachment::new("image/gif", vec![1u8, 2]);
    let err = svc.search(RetrievalQuery::Image(gif)).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidArgument(_)));
}

#[tokio::test]
async fn text_only_service_rejects_images() {
    let db = Database::open_in_memory().await.unwrap();
    let svc = RetrieverService::new(embedder(), Arc::new(SqliteDocumentStore::new(db, 3)));
    assert!(!svc.supports_images());
    let png = ImageAttachment::new("image/png", vec![1u8, 2]);
    assert!(matches!(
        svc.search_image(&png).await,
        Err(RagError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn image_dimension_mismatch_is_retrieval_error() {
    let db = Database::open_in_memory().await.unwrap();
    let documents = Arc::new(SqliteDocumentStore::new(db.clone(), 3));
    let svc = RetrieverService::new(embedder(), documents).with_image(ImageRetrieval {
        embedder: Arc::new(ByteImageEmbedder),
        index: Arc::new(SqliteImageIndex::new(db, 4)),
    });

    let png = ImageAttachment::new("image/png", vec![10u8, 0]);
    let err = svc.search_image(&png).await.unwrap_err();
    assert!(matches!(err, RagError::Retrieval { .. }), "got {err:?}");
}

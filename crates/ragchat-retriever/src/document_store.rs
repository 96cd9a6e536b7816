// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed text document store with in-process cosine ranking.

use async_trait::async_trait;
use ragchat_core::{Document, DocumentStore, RagError, ScoredDocument, cosine_similarity};
use tracing::{debug, warn};

use crate::database::{Database, blob_to_vec, storage_err, vec_to_blob};

/// Stores documents with their embeddings as BLOBs.
///
/// The privacy flag is stored in its own column so private rows are
/// filtered in SQL before any vector is decoded.
pub struct SqliteDocumentStore {
    db: Database,
    dimension: usize,
}

impl SqliteDocumentStore {
    pub fn new(db: Database, dimension: usize) -> Self {
        Self { db, dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        include_private: bool,
    ) -> Result<Vec<ScoredDocument>, RagError> {
        if embedding.len() != self.dimension {
            return Err(RagError::InvalidArgument(format!(
                "query embedding has {} dimensions, store expects {}",
                embedding.len(),
                self.dimension
            )));
        }

        let rows = self
            .db
            .connection()
            .call(move |conn| -> Result<Vec<(String, String, String, Vec<u8>)>, rusqlite::Error> {
                let sql = if include_private {
                    "SELECT id, content, meta, embedding FROM documents"
                } else {
                    "SELECT id, content, meta, embedding FROM documents WHERE privacy = 0"
                };
                let mut stmt = conn.prepare(sql)?;
                let rows = stmt.query_map([], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?;
                rows.collect()
            })
            .await
            .map_err(storage_err)?;

        let candidates = rows.len();
        let mut scored: Vec<ScoredDocument> = rows
            .into_iter()
            .filter_map(|(id, content, meta, blob)| {
                let stored = blob_to_vec(&blob);
                if stored.len() != embedding.len() {
                    warn!(id = %id, "skipping document with mismatched embedding size");
                    return None;
                }
                let meta = serde_json::from_str(&meta).unwrap_or_default();
                let score = cosine_similarity(embedding, &stored);
                Some(ScoredDocument {
                    document: Document {
                        id,
                        content,
                        meta,
                        embedding: stored,
                    },
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        debug!(candidates, returned = scored.len(), "document search");
        Ok(scored)
    }

    async fn save(&self, documents: Vec<Document>) -> Result<usize, RagError> {
        for doc in &documents {
            if doc.embedding.len() != self.dimension {
                return Err(RagError::InvalidArgument(format!(
                    "document `{}` has {} dimensions, store expects {}",
                    doc.id,
                    doc.embedding.len(),
                    self.dimension
                )));
            }
        }

        let rows: Vec<_> = documents
            .into_iter()
            .map(|doc| {
                let privacy = i64::from(doc.is_private());
                let meta = serde_json::Value::Object(doc.meta).to_string();
                (doc.id, doc.content, meta, privacy, vec_to_blob(&doc.embedding))
            })
            .collect();

        let saved = self
            .db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT OR REPLACE INTO documents (id, content, meta, privacy, embedding) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                    )?;
                    for (id, content, meta, privacy, blob) in &rows {
                        stmt.execute(rusqlite::params![id, content, meta, privacy, blob])?;
                    }
                }
                tx.commit()?;
                Ok(rows.len())
            })
            .await
            .map_err(storage_err)?;

        debug!(saved, "documents saved");
        Ok(saved)
    }

    async fn count(&self) -> Result<usize, RagError> {
        self.db
            .connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            })
            .await
            .map_err(storage_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, content: &str, embedding: Vec<f32>, private: bool) -> Document {
        let mut meta = serde_json::Map::new();
        meta.insert("privacy".into(), json!(if private { "1" } else { "0" }));
        Document {
            id: id.into(),
            content: content.into(),
            meta,
            embedding,
        }
    }

    async fn store() -> SqliteDocumentStore {
        SqliteDocumentStore::new(Database::open_in_memory().await.unwrap(), 3)
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let store = store().await;
        let hits = store.search(&[1.0, 0.0, 0.0], 2, false).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ranks_by_cosine_and_excludes_private() {
        let store = store().await;
        store
            .save(vec![
                doc("a", "closest", vec![1.0, 0.0, 0.0], false),
                doc("b", "second", vec![0.7, 0.7, 0.0], false),
                doc("c", "far", vec![0.0, 0.0, 1.0], false),
                doc("secret", "private match", vec![1.0, 0.0, 0.0], true),
            ])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 4);

        let hits = store.search(&[1.0, 0.0, 0.0], 2, false).await.unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.document.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(hits[0].document.meta["privacy"], json!("0"));

        let with_private = store.search(&[1.0, 0.0, 0.0], 10, true).await.unwrap();
        assert_eq!(with_private.len(), 4);
    }

    #[tokio::test]
    async fn save_replaces_by_id() {
        let store = store().await;
        store
            .save(vec![doc("a", "old", vec![1.0, 0.0, 0.0], false)])
            .await
            .unwrap();
        store
            .save(vec![doc("a", "new", vec![1.0, 0.0, 0.0], false)])
            .await
            .unwrap();
        let hits = store.search(&[1.0, 0.0, 0.0], 5, false).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.content, "new");
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let store = store().await;
        assert!(matches!(
            store.save(vec![doc("a", "x", vec![1.0], false)]).await,
            Err(RagError::InvalidArgument(_))
        ));
        assert!(store.search(&[1.0, 0.0], 1, false).await.is_err());
    }
}

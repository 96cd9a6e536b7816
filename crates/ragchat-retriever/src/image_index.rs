// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed nearest-neighbour index of described images.

use async_trait::async_trait;
use ragchat_core::{ImageEntry, ImageHit, ImageIndex, RagError, cosine_similarity};
use tracing::{debug, warn};

use crate::database::{Database, blob_to_vec, storage_err, vec_to_blob};

/// Image vectors of one fixed length, keyed by id.
///
/// Queries and saves with any other length are rejected, so a swapped
/// image model surfaces as an error instead of an empty result.
pub struct SqliteImageIndex {
    db: Database,
    dimension: usize,
}

impl SqliteImageIndex {
    pub fn new(db: Database, dimension: usize) -> Self {
        Self { db, dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[async_trait]
impl ImageIndex for SqliteImageIndex {
    async fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<ImageHit>, RagError> {
        if embedding.len() != self.dimension {
            return Err(RagError::InvalidArgument(format!(
                "image embedding has {} dimensions, index expects {}",
                embedding.len(),
                self.dimension
            )));
        }

        let rows = self
            .db
            .connection()
            .call(|conn| -> Result<Vec<(String, String, Vec<u8>)>, rusqlite::Error> {
                let mut stmt =
                    conn.prepare("SELECT id, describe, embedding FROM image_embeddings")?;
                let rows =
                    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
                rows.collect()
            })
            .await
            .map_err(storage_err)?;

        let mut hits: Vec<ImageHit> = rows
            .into_iter()
            .filter_map(|(id, describe, blob)| {
                let stored = blob_to_vec(&blob);
                if stored.len() != embedding.len() {
                    warn!(id = %id, "skipping image with mismatched embedding size");
                    return None;
                }
                Some(ImageHit {
                    describe,
                    score: cosine_similarity(embedding, &stored),
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        debug!(returned = hits.len(), "image search");
        Ok(hits)
    }

    async fn save(&self, entries: Vec<ImageEntry>) -> Result<usize, RagError> {
        for entry in &entries {
            if entry.embedding.len() != self.dimension {
                return Err(RagError::InvalidArgument(format!(
                    "image `{}` has {} dimensions, index expects {}",
                    entry.id,
                    entry.embedding.len(),
                    self.dimension
                )));
            }
        }

        let rows: Vec<_> = entries
            .into_iter()
            .map(|e| (e.id, e.describe, vec_to_blob(&e.embedding)))
            .collect();

        self.db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT OR REPLACE INTO image_embeddings (id, describe, embedding) \
                         VALUES (?1, ?2, ?3)",
                    )?;
                    for (id, describe, blob) in &rows {
                        stmt.execute(rusqlite::params![id, describe, blob])?;
                    }
                }
                tx.commit()?;
                Ok(rows.len())
            })
            .await
            .map_err(storage_err)
    }

    async fn count(&self) -> Result<usize, RagError> {
        self.db
            .connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM image_embeddings", [], |row| row.get(0))
            })
            .await
            .map_err(storage_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, describe: &str, embedding: Vec<f32>) -> ImageEntry {
        ImageEntry {
            id: id.into(),
            describe: describe.into(),
            embedding,
        }
    }

    #[tokio::test]
    async fn nearest_returns_closest_description() {
        let index = SqliteImageIndex::new(Database::open_in_memory().await.unwrap(), 2);
        assert!(index.nearest(&[1.0, 0.0], 1).await.unwrap().is_empty());

        index
            .save(vec![
                entry("3me3", "This is the 3ME3 industrial SSD", vec![1.0, 0.1]),
                entry("3te7", "This is the 3TE7 industrial SSD", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();
        assert_eq!(index.count().await.unwrap(), 2);

        let hits = index.nearest(&[0.1, 0.9], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].describe, "This is the 3TE7 industrial SSD");
    }

    #[tokio::test]
    async fn mismatched_dimensions_are_rejected() {
        let index = SqliteImageIndex::new(Database::open_in_memory().await.unwrap(), 4);

        let err = index
            .save(vec![entry("short", "three values", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::InvalidArgument(_)), "got {err:?}");
        assert_eq!(index.count().await.unwrap(), 0);

        index
            .save(vec![entry("ok", "four values", vec![1.0, 0.0, 0.0, 0.0])])
            .await
            .unwrap();
        let err = index.nearest(&[1.0, 0.0, 0.0], 1).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidArgument(_)), "got {err:?}");

        let hits = index.nearest(&[1.0, 0.0, 0.0, 0.0], 1).await.unwrap();
        assert_eq!(hits[0].describe, "four values");
    }
}

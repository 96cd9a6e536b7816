// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite connection setup and schema for the vector stores.
//!
//! All statements run on tokio-rusqlite's single background thread per
//! connection, which serializes writes.

use std::path::Path;

use ragchat_core::RagError;
use tokio_rusqlite::Connection;
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id        TEXT PRIMARY KEY NOT NULL,
    content   TEXT NOT NULL,
    meta      TEXT NOT NULL DEFAULT '{}',
    privacy   INTEGER NOT NULL DEFAULT 0,
    embedding BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_documents_privacy ON documents(privacy);

CREATE TABLE IF NOT EXISTS image_embeddings (
    id        TEXT PRIMARY KEY NOT NULL,
    describe  TEXT NOT NULL,
    embedding BLOB NOT NULL
);
";

/// Convert tokio-rusqlite errors into `RagError::Storage`.
pub(crate) fn storage_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> RagError {
    RagError::Storage {
        source: Box::new(e),
    }
}

/// Shared handle to the vector database.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` and apply the schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RagError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RagError::Storage {
                    source: Box::new(e),
                })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| RagError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.init(true).await?;
        debug!(path = %path.display(), "vector database opened");
        Ok(db)
    }

    /// In-memory database, used by tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, RagError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RagError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.init(false).await?;
        Ok(db)
    }

    async fn init(&self, wal: bool) -> Result<(), RagError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal {
                    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
                }
                conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Encode an embedding as a little-endian f32 BLOB.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Decode a little-endian f32 BLOB. Trailing partial chunks are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_encoding_is_little_endian_f32() {
        let v = vec![1.0f32, -0.5, 3.25];
        let blob = vec_to_blob(&v);
        assert_eq!(blob.len(), 12);
        assert_eq!(&blob[..4], &1.0f32.to_le_bytes());
        assert_eq!(blob_to_vec(&blob), v);
    }

    #[tokio::test]
    async fn open_creates_schema_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/ragchat.db");
        let db = Database::open(&path).await.unwrap();
        assert!(path.exists());

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn
                    .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        assert!(tables.contains(&"documents".to_string()));
        assert!(tables.contains(&"image_embeddings".to_string()));
    }
}

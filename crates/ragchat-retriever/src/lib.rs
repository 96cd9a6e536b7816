// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval for ragchat.
//!
//! Text queries are embedded and ranked by cosine similarity against the
//! `documents` table, skipping private documents; every hit is
//! concatenated into one context string. Image queries are embedded and
//! matched against `image_embeddings`, returning the nearest description.

pub mod database;
pub mod document_store;
pub mod image_index;
pub mod service;

pub use database::Database;
pub use document_store::SqliteDocumentStore;
pub use image_index::SqliteImageIndex;
pub use service::{ImageRetrieval, RetrieverService};

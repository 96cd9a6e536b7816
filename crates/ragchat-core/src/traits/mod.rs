// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits for the remote model adapters and vector stores.
//!
//! Every model-serving adapter extends [`ModelAdapter`] and uses
//! `#[async_trait]` so implementations can be held as trait objects.

pub mod adapter;
pub mod classifier;
pub mod embedding;
pub mod generation;
pub mod store;

pub use adapter::ModelAdapter;
pub use classifier::TopicClassifier;
pub use embedding::{ImageEmbedder, TextEmbedder};
pub use generation::{ChunkStream, TextGenerator};
pub use store::{DocumentStore, ImageIndex};

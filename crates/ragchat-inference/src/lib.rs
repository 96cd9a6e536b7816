// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters for the self-hosted model servers: a zero-shot topic
//! classifier and an image embedding model.

pub mod classifier;
pub mod client;
pub mod image;
pub mod types;

pub use classifier::HttpTopicClassifier;
pub use client::InferenceClient;
pub use image::HttpImageEmbedder;

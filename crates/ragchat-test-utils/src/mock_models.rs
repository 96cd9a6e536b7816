// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedders and topic classifier.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use ragchat_core::{
    AdapterType, HealthStatus, ImageAttachment, ImageEmbedder, ModelAdapter, RagError,
    TextEmbedder, Topic, TopicClassifier,
};

/// Dimension of every vector the mock embedders produce.
pub const MOCK_DIMENSION: usize = 32;

/// FNV-1a, so bucket assignment is stable across runs.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Bag-of-words embedding: texts sharing words score higher.
pub fn bag_of_words(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; MOCK_DIMENSION];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let bucket = fnv1a(word.to_lowercase().as_bytes()) as usize % MOCK_DIMENSION;
        vector[bucket] += 1.0;
    }
    vector
}

/// Text embedder backed by [`bag_of_words`].
#[derive(Default)]
pub struct MockEmbedder {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call fail with `BackendUnavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TextEmbedding
    }

    async fn health_check(&self) -> Result<HealthStatus, RagError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl TextEmbedder for MockEmbedder {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RagError::unavailable("mock-embedder", "embedding service down"));
        }
        Ok(bag_of_words(text))
    }
}

/// Image embedder that hashes the raw bytes, so identical images collide.
#[derive(Default)]
pub struct MockImageEmbedder;

impl MockImageEmbedder {
    /// The vector [`MockImageEmbedder`] produces for `bytes`.
    pub fn vector_for(bytes: &[u8]) -> Vec<f32> {
        let mut vector = vec![0.0; MOCK_DIMENSION];
        vector[fnv1a(bytes) as usize % MOCK_DIMENSION] = 1.0;
        vector
    }
}

#[async_trait]
impl ModelAdapter for MockImageEmbedder {
    fn name(&self) -> &str {
        "mock-image-embedder"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ImageEmbedding
    }

    async fn health_check(&self) -> Result<HealthStatus, RagError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ImageEmbedder for MockImageEmbedder {
    async fn embed_image(&self, image: &ImageAttachment) -> Result<Vec<f32>, RagError> {
        image.extension()?;
        Ok(Self::vector_for(&image.bytes))
    }
}

/// Keyword classifier: a sentence gets every topic whose keyword it contains,
/// in rule order.
pub struct MockClassifier {
    vocabulary: Vec<Topic>,
    rules: Vec<(String, Topic)>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockClassifier {
    pub fn new(vocabulary: Vec<Topic>) -> Self {
        Self {
            vocabulary,
            rules: Vec::new(),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Map sentences containing `keyword` (case-insensitive) to `topic`.
    ///
    /// `topic` need not be in the vocabulary; that lets tests exercise
    /// downstream rejection of unknown topics.
    pub fn rule(mut self, keyword: &str, topic: impl Into<Topic>) -> Self {
        self.rules.push((keyword.to_lowercase(), topic.into()));
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelAdapter for MockClassifier {
    fn name(&self) -> &str {
        "mock-classifier"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TopicClassification
    }

    async fn health_check(&self) -> Result<HealthStatus, RagError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl TopicClassifier for MockClassifier {
    async fn classify(&self, sentence: &str, top_k: usize) -> Result<Vec<Topic>, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RagError::unavailable("mock-classifier", "topic service down"));
        }

        let sentence = sentence.to_lowercase();
        let mut topics: Vec<Topic> = Vec::new();
        for (keyword, topic) in &self.rules {
            if sentence.contains(keyword.as_str()) && !topics.contains(topic) {
                topics.push(topic.clone());
            }
        }
        topics.truncate(top_k);
        Ok(topics)
    }

    fn vocabulary(&self) -> &[Topic] {
        &self.vocabulary
    }
}

// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zero-shot topic classification.

use async_trait::async_trait;

use crate::error::RagError;
use crate::traits::adapter::ModelAdapter;
use crate::types::Topic;

/// Maps free text to a ranked subset of the configured topic vocabulary.
#[async_trait]
pub trait TopicClassifier: ModelAdapter {
    /// Returns up to `top_k` topics, most relevant first.
    ///
    /// Every returned topic belongs to [`TopicClassifier::vocabulary`].
    async fn classify(&self, sentence: &str, top_k: usize) -> Result<Vec<Topic>, RagError>;

    /// The fixed vocabulary this classifier chooses from.
    fn vocabulary(&self) -> &[Topic];
}

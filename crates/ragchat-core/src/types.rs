// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the memory, retrieval, and agent crates.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::RagError;

/// A classification label from the fixed topic vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(pub String);

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Topic(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Topic(s.to_string())
    }
}

/// One (question, answer) exchange stored in short-term memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user: String,
    pub bot: String,
}

impl ChatTurn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
        }
    }
}

/// Speaker of a chat message sent to the generation model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Image content types accepted by the image embedding service.
pub const SUPPORTED_IMAGE_TYPES: &[(&str, &str)] = &[("image/jpeg", "jpg"), ("image/png", "png")];

/// An image uploaded alongside (or instead of) a prompt.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageAttachment {
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: None,
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// File extension for the content type, or `InvalidArgument` if unsupported.
    pub fn extension(&self) -> Result<&'static str, RagError> {
        SUPPORTED_IMAGE_TYPES
            .iter()
            .find(|(ct, _)| *ct == self.content_type)
            .map(|(_, ext)| *ext)
            .ok_or_else(|| {
                RagError::InvalidArgument(format!(
                    "unsupported image content type `{}`",
                    self.content_type
                ))
            })
    }

    /// The uploaded file name, or `unknown.<ext>` when none was given.
    pub fn upload_name(&self) -> Result<String, RagError> {
        let ext = self.extension()?;
        Ok(self
            .file_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("unknown.{ext}")))
    }
}

/// A retrieval request, resolved to one modality at the API boundary.
#[derive(Debug, Clone)]
pub enum RetrievalQuery {
    Text(String),
    Image(ImageAttachment),
}

/// A stored text document for the vector-similarity store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub meta: serde_json::Map<String, serde_json::Value>,
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

impl Document {
    /// A document is private when `meta.privacy` is `"1"` (or the number 1).
    pub fn is_private(&self) -> bool {
        match self.meta.get("privacy") {
            Some(serde_json::Value::String(s)) => s == "1",
            Some(serde_json::Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        }
    }
}

/// A document returned from a similarity search.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// A stored image vector with its textual description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    pub id: String,
    pub describe: String,
    pub embedding: Vec<f32>,
}

/// A nearest-neighbour hit from the image index.
#[derive(Debug, Clone)]
pub struct ImageHit {
    pub describe: String,
    pub score: f32,
}

/// Identity attached to a chat request (used for log correlation only).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserHandle {
    pub department: String,
    pub username: String,
}

impl UserHandle {
    pub fn new(department: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            username: username.into(),
        }
    }
}

/// A single chat turn submitted to the agent.
#[derive(Debug, Clone, Default)]
pub struct ConversationRequest {
    pub user: UserHandle,
    pub prompt: String,
    pub attachment: Option<ImageAttachment>,
    /// Inserted as the very first system message when present.
    pub greeting: Option<String>,
}

impl ConversationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user: UserHandle) -> Self {
        self.user = user;
        self
    }

    pub fn with_attachment(mut self, attachment: ImageAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }
}

/// Phases of the chat pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Classify,
    Recall,
    Retrieve,
    Assemble,
    Generate,
    Persist,
}

/// A fragment streamed back to the caller of a chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatChunk {
    /// Answer text; the concatenation of all `Text` chunks is the full answer.
    Text(String),
    /// Generation stopped early. No `Text` follows it, though a
    /// `PersistenceError` still may, so keep polling until the stream ends.
    GenerationError(String),
    /// The answer was delivered but could not be written to short-term memory.
    PersistenceError(String),
}

impl ChatChunk {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ChatChunk::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, ChatChunk::Text(_))
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

/// Identifies the capability an adapter provides.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    TextGeneration,
    TextEmbedding,
    ImageEmbedding,
    TopicClassification,
}

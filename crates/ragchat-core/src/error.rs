// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the ragchat backend.

use thiserror::Error;

use crate::types::Phase;

/// Boxed error used as the `source` of wrapped failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all ragchat adapters and services.
#[derive(Debug, Error)]
pub enum RagError {
    /// Malformed selector, unsupported input modality, unknown topic.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Delete-by-index/value or lookup miss.
    #[error("not found: {0}")]
    NotFound(String),

    /// A downstream HTTP service failed, returned non-success, or was unreachable.
    #[error("{service} unavailable: {message}")]
    BackendUnavailable {
        service: String,
        message: String,
        source: Option<BoxError>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Topic classification could not be produced.
    #[error("classification failed: {message}")]
    Classification {
        message: String,
        source: Option<BoxError>,
    },

    /// A retrieval backend (embedding or vector store) failed.
    #[error("retrieval failed: {message}")]
    Retrieval {
        message: String,
        source: Option<BoxError>,
    },

    /// Text generation failed, possibly after partial output.
    #[error("generation failed: {message}")]
    Generation {
        message: String,
        source: Option<BoxError>,
    },

    /// Memory write-back failed after generation completed.
    #[error("persistence failed: {message}")]
    Persistence {
        message: String,
        source: Option<BoxError>,
    },

    /// A pipeline phase failed; carries the phase name and the cause.
    #[error("{phase} phase failed: {source}")]
    Pipeline {
        phase: Phase,
        #[source]
        source: Box<RagError>,
    },

    /// Configuration errors (invalid values, missing settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage { source: BoxError },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RagError {
    /// Wraps `self` as the failure of `phase`. Already-wrapped errors are kept as is.
    pub fn in_phase(self, phase: Phase) -> Self {
        match self {
            RagError::Pipeline { .. } => self,
            other => RagError::Pipeline {
                phase,
                source: Box::new(other),
            },
        }
    }

    /// Returns the failed phase for pipeline errors.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            RagError::Pipeline { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Returns the innermost non-pipeline error.
    pub fn cause(&self) -> &RagError {
        match self {
            RagError::Pipeline { source, .. } => source.cause(),
            other => other,
        }
    }

    /// Shorthand for a `BackendUnavailable` without a source error.
    pub fn unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        RagError::BackendUnavailable {
            service: service.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a `Generation` error without a source error.
    pub fn generation(message: impl Into<String>) -> Self {
        RagError::Generation {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a `Retrieval` error wrapping `source`.
    pub fn retrieval(message: impl Into<String>, source: RagError) -> Self {
        RagError::Retrieval {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for a `Classification` error wrapping `source`.
    pub fn classification(message: impl Into<String>, source: RagError) -> Self {
        RagError::Classification {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for ragchat integration tests.
//!
//! Provides scripted adapters that stand in for the model servers and a
//! [`TestHarness`] that wires them into a complete agent.

pub mod harness;
pub mod mock_generator;
pub mod mock_history;
pub mod mock_models;
pub mod mock_store;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_generator::{MockGenerator, Script, ScriptStep};
pub use mock_history::SwitchableHistory;
pub use mock_models::{MockClassifier, MockEmbedder, MockImageEmbedder};
pub use mock_store::{MemoryDocumentStore, MemoryImageIndex};

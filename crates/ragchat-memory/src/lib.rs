// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversational memory for ragchat.
//!
//! - [`ShortTermMemory`]: bounded recent turns per topic, behind the
//!   [`HistoryStore`] trait.
//! - [`LongTermMemory`]: standing instructions edited administratively.
//! - [`MemoryService`]: combines both and turns raw history into a
//!   generated summary for the answer prompt.

pub mod long_term;
pub mod service;
pub mod short_term;

pub use long_term::{InstructionSelector, LongTermMemory};
pub use service::MemoryService;
pub use short_term::{HistoryStore, ShortTermMemory};

// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by all remote model adapters.

use async_trait::async_trait;

use crate::error::RagError;
use crate::types::{AdapterType, HealthStatus};

/// Identity, readiness, and model lifecycle for a remote model adapter.
///
/// `load` and `release` pin and unpin the model in its serving runtime.
/// They run at service start and stop, never per request. Backends without
/// a lifecycle keep the default no-op implementations.
#[async_trait]
pub trait ModelAdapter: Send + Sync + 'static {
    /// Returns the model name this adapter serves.
    fn name(&self) -> &str;

    /// Returns the capability this adapter provides.
    fn adapter_type(&self) -> AdapterType;

    /// Reports whether the backing service is reachable and the model is ready.
    async fn health_check(&self) -> Result<HealthStatus, RagError>;

    /// Keeps the model resident in the serving runtime.
    async fn load(&self) -> Result<(), RagError> {
        Ok(())
    }

    /// Lets the serving runtime unload the model.
    async fn release(&self) -> Result<(), RagError> {
        Ok(())
    }
}

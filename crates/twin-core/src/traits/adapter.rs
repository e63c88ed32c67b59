// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by every pluggable component.

use async_trait::async_trait;

use crate::error::TwinError;
use crate::types::{AdapterType, HealthStatus};

/// Identity, lifecycle and health for a pluggable Twin component.
///
/// Backends are constructed by the host application and injected into the
/// pipeline; this trait is how the host inspects and shuts them down.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, TwinError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), TwinError>;
}

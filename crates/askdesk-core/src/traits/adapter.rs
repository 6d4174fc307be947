// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all askdesk adapters implement.

use async_trait::async_trait;

use crate::error::AskdeskError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all askdesk adapters.
///
/// Provides identity and health check capabilities shared by the assistant
/// client, the interaction log, and escalation delivery.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, AskdeskError>;
}

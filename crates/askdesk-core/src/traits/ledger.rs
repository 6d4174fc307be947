// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interaction log trait for the append-only turn record.

use async_trait::async_trait;

use crate::error::AskdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{LogRecord, StatsReport};

/// Append-only store of completed turns.
///
/// Implementations must be safe to call from concurrent requests.
#[async_trait]
pub trait InteractionLog: PluginAdapter {
    /// Appends one record. Fails with [`AskdeskError::Logging`].
    async fn append(&self, record: &LogRecord) -> Result<(), AskdeskError>;

    /// Summarizes the log, keeping the last `recent_limit` rows.
    ///
    /// A log that does not exist yet yields an empty report.
    async fn stats(&self, recent_limit: usize) -> Result<StatsReport, AskdeskError>;
}

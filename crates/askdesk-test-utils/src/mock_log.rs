// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory interaction logs.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use askdesk_core::traits::{InteractionLog, PluginAdapter};
use askdesk_core::types::{AdapterType, HealthStatus, LogRecord, StatsReport};
use askdesk_core::AskdeskError;

/// Captures appended rows for assertion in tests.
pub struct RecordingLog {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// All rows appended so far, oldest first.
    pub async fn records(&self) -> Vec<LogRecord> {
        self.records.lock().await.clone()
    }
}

impl Default for RecordingLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for RecordingLog {
    fn name(&self) -> &str {
        "recording-log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Ledger
    }

    async fn health_check(&self) -> Result<HealthStatus, AskdeskError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl InteractionLog for RecordingLog {
    async fn append(&self, record: &LogRecord) -> Result<(), AskdeskError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn stats(&self, recent_limit: usize) -> Result<StatsReport, AskdeskError> {
        let records = self.records.lock().await;
        let distinct_threads = records
            .iter()
            .map(|r| r.thread_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let skip = records.len().saturating_sub(recent_limit);
        Ok(StatsReport {
            distinct_threads,
            total_questions: records.len(),
            recent: records[skip..].to_vec(),
        })
    }
}

/// Rejects every read and write, like a log on an unwritable path.
#[derive(Default)]
pub struct FailingLog;

impl FailingLog {
    fn error() -> AskdeskError {
        AskdeskError::logging(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "log is not writable",
        ))
    }
}

#[async_trait]
impl PluginAdapter for FailingLog {
    fn name(&self) -> &str {
        "failing-log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Ledger
    }

    async fn health_check(&self) -> Result<HealthStatus, AskdeskError> {
        Ok(HealthStatus::Unhealthy("log is not writable".into()))
    }
}

#[async_trait]
impl InteractionLog for FailingLog {
    async fn append(&self, _record: &LogRecord) -> Result<(), AskdeskError> {
        Err(Self::error())
    }

    async fn stats(&self, _recent_limit: usize) -> Result<StatsReport, AskdeskError> {
        Err(Self::error())
    }
}

// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation delivery that captures records.

use async_trait::async_trait;
use tokio::sync::Mutex;

use askdesk_core::traits::{EscalationDelivery, PluginAdapter};
use askdesk_core::types::{AdapterType, EscalationRecord, HealthStatus};
use askdesk_core::AskdeskError;

/// Captures delivered escalations. Optionally fails after capturing.
pub struct RecordingDelivery {
    delivered: Mutex<Vec<EscalationRecord>>,
    fail: bool,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A delivery that records the escalation and then reports failure.
    pub fn failing() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn delivered(&self) -> Vec<EscalationRecord> {
        self.delivered.lock().await.clone()
    }
}

impl Default for RecordingDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for RecordingDelivery {
    fn name(&self) -> &str {
        "recording-delivery"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Delivery
    }

    async fn health_check(&self) -> Result<HealthStatus, AskdeskError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EscalationDelivery for RecordingDelivery {
    async fn deliver(&self, record: &EscalationRecord) -> Result<(), AskdeskError> {
        self.delivered.lock().await.push(record.clone());
        if self.fail {
            return Err(AskdeskError::Internal("scripted delivery failure".into()));
        }
        Ok(())
    }
}

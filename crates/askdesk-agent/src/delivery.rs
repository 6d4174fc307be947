// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use askdesk_core::traits::{EscalationDelivery, PluginAdapter};
use askdesk_core::types::{AdapterType, EscalationRecord, HealthStatus};
use askdesk_core::AskdeskError;
use async_trait::async_trait;
use tracing::info;

/// Writes escalations to the operational log.
///
/// Stands in for an email or ticketing channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDelivery;

#[async_trait]
impl PluginAdapter for TracingDelivery {
    fn name(&self) -> &str {
        "tracing-delivery"
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
impl EscalationDelivery for TracingDelivery {
    async fn deliver(&self, record: &EscalationRecord) -> Result<(), AskdeskError> {
        info!(
            target: "askdesk::escalation",
            thread_id = %record.thread_id,
            note = %record.note(),
            "escalation ready for human review"
        );
        Ok(())
    }
}

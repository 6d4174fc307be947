// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hand-off channel for escalated conversations.

use async_trait::async_trait;

use crate::error::AskdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::EscalationRecord;

/// Delivers an escalation to a human-operated channel (email, ticketing, ...).
#[async_trait]
pub trait EscalationDelivery: PluginAdapter {
    async fn deliver(&self, record: &EscalationRecord) -> Result<(), AskdeskError>;
}

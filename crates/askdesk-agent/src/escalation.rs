// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hand-off of a conversation to a human.
//!
//! The transcript is captured first, then the assistant is asked for a
//! summary on the same thread. A summary that cannot be produced is replaced
//! by a placeholder, and a delivery failure is only logged.

use std::sync::Arc;

use askdesk_core::traits::{AssistantClient, EscalationDelivery};
use askdesk_core::types::{EscalationRecord, RunState, ThreadId};
use askdesk_core::AskdeskError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::extract::{self, TranscriptEntry};
use crate::poll::{self, PollPolicy};

/// Prompt posted to the thread to obtain a summary.
pub const SUMMARY_PROMPT: &str = "Please summarize the conversation so far.";

/// Summary used when the assistant could not produce one.
pub const SUMMARY_UNAVAILABLE: &str = "[Summary error or not available]";

/// Result of an escalation, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationOutcome {
    pub thread_id: ThreadId,
    pub summary: String,
    /// History before the summary request, oldest first.
    pub transcript: Vec<TranscriptEntry>,
    /// Whether the delivery channel accepted the record.
    pub delivered: bool,
}

pub struct EscalationHandler {
    client: Arc<dyn AssistantClient>,
    delivery: Arc<dyn EscalationDelivery>,
    policy: PollPolicy,
    shutdown: CancellationToken,
}

impl EscalationHandler {
    pub fn new(
        client: Arc<dyn AssistantClient>,
        delivery: Arc<dyn EscalationDelivery>,
        policy: PollPolicy,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            delivery,
            policy,
            shutdown,
        }
    }

    /// Escalates `thread_id`.
    ///
    /// Only a failure to fetch the history is returned as an error.
    pub async fn escalate(&self, thread_id: &ThreadId) -> Result<EscalationOutcome, AskdeskError> {
        let mut history = self.client.list_messages(thread_id).await?;
        extract::sort_chronologically(&mut history);
        let transcript = extract::transcript(&history);

        let summary = match self.summarize(thread_id).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(thread_id = %thread_id, error = %e, "summary not available");
                SUMMARY_UNAVAILABLE.to_string()
            }
        };

        let record = EscalationRecord {
            thread_id: thread_id.clone(),
            summary: summary.clone(),
            transcript: extract::render_plain(&transcript),
        };

        let delivered = match self.delivery.deliver(&record).await {
            Ok(()) => {
                info!(thread_id = %thread_id, channel = self.delivery.name(), "conversation escalated");
                true
            }
            Err(e) => {
                error!(thread_id = %thread_id, error = %e, "failed to deliver escalation");
                false
            }
        };

        Ok(EscalationOutcome {
            thread_id: thread_id.clone(),
            summary,
            transcript,
            delivered,
        })
    }

    /// Asks the assistant for a summary. Only a completed run counts.
    async fn summarize(&self, thread_id: &ThreadId) -> Result<String, AskdeskError> {
        let dispatched = self
            .client
            .continue_conversation(thread_id, SUMMARY_PROMPT, None)
            .await?;
        let state =
            poll::wait_for_terminal(self.client.as_ref(), &dispatched, &self.policy, &self.shutdown)
                .await?;
        if state != RunState::Completed {
            return Err(AskdeskError::remote(format!("summary run ended as {state}")));
        }

        let mut messages = self.client.list_messages(thread_id).await?;
        extract::sort_chronologically(&mut messages);
        extract::latest_answer(&messages)
            .and_then(|message| message.first_text())
            .map(str::to_string)
            .ok_or_else(|| AskdeskError::remote("summary run produced no text"))
    }
}

// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn orchestration for askdesk.
//!
//! A turn sends one question to the remote assistant, waits for the run to
//! finish, and extracts the answer, its citations, and the transcript:
//! - [`TurnOrchestrator`] drives a turn and records it in the interaction log
//! - [`EscalationHandler`] packages a thread for human review
//! - [`poll`] bounds and cancels the wait on remote runs

pub mod attachment;
pub mod delivery;
pub mod escalation;
pub mod extract;
pub mod poll;
pub mod shutdown;
pub mod turn;

pub use attachment::Attachment;
pub use delivery::TracingDelivery;
pub use escalation::{EscalationHandler, EscalationOutcome, SUMMARY_PROMPT, SUMMARY_UNAVAILABLE};
pub use extract::{TranscriptEntry, NO_ANSWER};
pub use poll::PollPolicy;
pub use turn::{TurnError, TurnOrchestrator, TurnOutcome, TurnRequest, TurnStage};

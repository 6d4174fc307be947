// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for askdesk integration tests.
//!
//! Provides scripted adapters for fast, deterministic tests without a remote
//! assistant service or a real log file.
//!
//! # Components
//!
//! - [`ScriptedAssistant`] - In-memory assistant with per-run state scripts
//! - [`RecordingLog`] / [`FailingLog`] - Interaction logs that capture or reject rows
//! - [`RecordingDelivery`] - Escalation delivery that captures records

pub mod mock_assistant;
pub mod mock_delivery;
pub mod mock_log;

pub use mock_assistant::{ScriptedAnswer, ScriptedAssistant, UploadedFile};
pub use mock_delivery::RecordingDelivery;
pub use mock_log::{FailingLog, RecordingLog};

// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of pipeline errors onto HTTP responses.

use askdesk_core::AskdeskError;
use axum::http::StatusCode;

/// Status code for a failed turn or escalation.
pub fn status_for(error: &AskdeskError) -> StatusCode {
    match error {
        AskdeskError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AskdeskError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        AskdeskError::RemoteUnavailable { .. }
        | AskdeskError::Upload { .. }
        | AskdeskError::Lookup { .. } => StatusCode::BAD_GATEWAY,
        AskdeskError::Config(_) | AskdeskError::Logging { .. } | AskdeskError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Page title and user-facing explanation for a failure.
pub fn describe(error: &AskdeskError) -> (&'static str, String) {
    match error {
        AskdeskError::InvalidInput(_) => (
            "Invalid request",
            "The conversation id is not valid. Please start a new conversation.".to_string(),
        ),
        AskdeskError::Timeout { duration } => (
            "The assistant is taking too long",
            format!(
                "No answer arrived within {} seconds. Please try again.",
                duration.as_secs()
            ),
        ),
        AskdeskError::Upload { .. } => (
            "Attachment could not be uploaded",
            "Your file could not be uploaded, so the question was not sent. \
             Please try again or ask without the attachment."
                .to_string(),
        ),
        AskdeskError::RemoteUnavailable { .. } | AskdeskError::Lookup { .. } => (
            "The assistant is unavailable",
            "The assistant service could not be reached. Please try again shortly.".to_string(),
        ),
        AskdeskError::Config(_) | AskdeskError::Logging { .. } | AskdeskError::Internal(_) => (
            "Something went wrong",
            "An internal error occurred.".to_string(),
        ),
    }
}

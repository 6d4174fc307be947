// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for askdesk.

use thiserror::Error;

/// The primary error type used across all askdesk adapter traits and the turn pipeline.
#[derive(Debug, Error)]
pub enum AskdeskError {
    /// Configuration errors (missing credential, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote assistant service could not be reached or answered with an error.
    #[error("assistant service unavailable: {message}")]
    RemoteUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A cited file could not be resolved to a filename.
    #[error("file lookup failed for {file_id}: {message}")]
    Lookup { file_id: String, message: String },

    /// Uploading an attached file failed.
    #[error("file upload failed: {message}")]
    Upload {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Writing or reading the interaction log failed.
    #[error("interaction log error: {source}")]
    Logging {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A remote run did not reach a terminal state in time.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Client input that cannot be passed on to the assistant service.
    #[error("invalid request: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AskdeskError {
    /// Shorthand for a [`AskdeskError::RemoteUnavailable`] without an underlying source.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any error as a [`AskdeskError::Logging`] failure.
    pub fn logging(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Logging {
            source: source.into(),
        }
    }
}

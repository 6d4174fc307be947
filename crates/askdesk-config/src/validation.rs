// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use crate::diagnostic::ConfigError;
use crate::model::AskdeskConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &AskdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.assistant.assistant_id.trim().is_empty() {
        errors.push(ConfigError::MissingKey {
            key: "assistant.assistant_id".to_string(),
        });
    }

    if config.assistant.vector_store_ids.is_empty() {
        errors.push(ConfigError::MissingKey {
            key: "assistant.vector_store_ids".to_string(),
        });
    }

    for (i, id) in config.assistant.vector_store_ids.iter().enumerate() {
        if id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("assistant.vector_store_ids[{i}] must not be empty"),
            });
        }
    }

    let base_url = config.assistant.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("assistant.base_url `{base_url}` must be an http(s) URL"),
        });
    }

    if config.assistant.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "assistant.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.poll.interval_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "poll.interval_ms must be at least 1".to_string(),
        });
    }

    if config.poll.max_wait_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "poll.max_wait_secs must be at least 1".to_string(),
        });
    }

    if config.poll.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "poll.max_attempts must be at least 1".to_string(),
        });
    }

    if config.ledger.path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "ledger.path must not be empty".to_string(),
        });
    }

    if config.server.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

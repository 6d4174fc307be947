// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level askdesk configuration.
///
/// Built once at process start and shared by reference with every component.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AskdeskConfig {
    /// Remote assistant identity and credentials.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Run polling cadence and bounds.
    #[serde(default)]
    pub poll: PollConfig,

    /// Interaction log settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Operational logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote assistant configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    /// Identifier of the remote assistant that answers questions.
    #[serde(default)]
    pub assistant_id: String,

    /// Knowledge sources (vector store ids) searched when a conversation starts.
    #[serde(default)]
    pub vector_store_ids: Vec<String>,

    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the assistant API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            assistant_id: String::new(),
            vector_store_ids: Vec::new(),
            api_key: None,
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("assistant_id", &self.assistant_id)
            .field("vector_store_ids", &self.vector_store_ids)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Polling configuration for remote runs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollConfig {
    /// Delay between two status checks, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Upper bound on the total time spent waiting for one run.
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,

    /// Upper bound on the number of status checks for one run.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_wait_secs: default_max_wait_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_max_wait_secs() -> u64 {
    120
}

fn default_max_attempts() -> u32 {
    120
}

/// Interaction log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Path of the append-only CSV file.
    #[serde(default = "default_ledger_path")]
    pub path: String,

    /// Number of rows shown on the stats page.
    #[serde(default = "default_recent_rows")]
    pub recent_rows: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
            recent_rows: default_recent_rows(),
        }
    }
}

fn default_ledger_path() -> String {
    "chat_metrics.csv".to_string()
}

fn default_recent_rows() -> usize {
    10
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body (attachments included), in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

/// Operational logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

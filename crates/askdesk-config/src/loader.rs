// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./askdesk.toml` > `~/.config/askdesk/askdesk.toml` > `/etc/askdesk/askdesk.toml`
//! with environment variable overrides via `ASKDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::AskdeskConfig;

/// Top-level sections that environment variables may address.
const SECTIONS: &[&str] = &["assistant", "poll", "ledger", "server", "logging"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/askdesk/askdesk.toml` (system-wide)
/// 3. `~/.config/askdesk/askdesk.toml` (user XDG config)
/// 4. `./askdesk.toml` (local directory)
/// 5. `ASKDESK_*` environment variables
pub fn load_config() -> Result<AskdeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<AskdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AskdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AskdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AskdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn config_files() -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from("/etc/askdesk/askdesk.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        files.push(config_dir.join("askdesk").join("askdesk.toml"));
    }
    let local = std::env::current_dir()
        .map(|dir| dir.join("askdesk.toml"))
        .unwrap_or_else(|_| PathBuf::from("askdesk.toml"));
    files.push(local);
    files
}

/// Build the Figment used for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    config_files()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(AskdeskConfig::default())),
            |figment, file| figment.merge(Toml::file(file)),
        )
        .merge(env_provider())
}

/// Environment provider that maps `ASKDESK_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `ASKDESK_ASSISTANT_VECTOR_STORE_IDS` maps to `assistant.vector_store_ids`.
fn env_provider() -> Env {
    Env::prefixed("ASKDESK_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

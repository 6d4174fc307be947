// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the askdesk configuration system.

use askdesk_config::diagnostic::ConfigError;
use askdesk_config::model::AskdeskConfig;
use askdesk_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

const MINIMAL: &str = r#"
[assistant]
assistant_id = "asst_test"
vector_store_ids = ["vs_test"]
"#;

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn full_toml_deserializes() {
    let toml = r#"
[assistant]
assistant_id = "asst_1"
vector_store_ids = ["vs_1", "vs_2"]
api_key = "sk-test"
base_url = "http://localhost:9999/v1"
request_timeout_secs = 5

[poll]
interval_ms = 250
max_wait_secs = 30
max_attempts = 40

[ledger]
path = "/tmp/metrics.csv"
recent_rows = 25

[server]
host = "127.0.0.1"
port = 3000
max_upload_bytes = 1024

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.assistant.assistant_id, "asst_1");
    assert_eq!(config.assistant.vector_store_ids, vec!["vs_1", "vs_2"]);
    assert_eq!(config.assistant.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.assistant.base_url, "http://localhost:9999/v1");
    assert_eq!(config.assistant.request_timeout_secs, 5);
    assert_eq!(config.poll.interval_ms, 250);
    assert_eq!(config.poll.max_wait_secs, 30);
    assert_eq!(config.poll.max_attempts, 40);
    assert_eq!(config.ledger.path, "/tmp/metrics.csv");
    assert_eq!(config.ledger.recent_rows, 25);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.max_upload_bytes, 1024);
    assert_eq!(config.logging.level, "debug");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert!(config.assistant.assistant_id.is_empty());
    assert!(config.assistant.api_key.is_none());
    assert_eq!(config.assistant.base_url, "https://api.openai.com/v1");
    assert_eq!(config.poll.interval_ms, 1000);
    assert_eq!(config.poll.max_wait_secs, 120);
    assert_eq!(config.ledger.path, "chat_metrics.csv");
    assert_eq!(config.ledger.recent_rows, 10);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.logging.level, "info");
}

/// Identifiers are required, so an empty config does not validate.
#[test]
fn empty_config_fails_validation() {
    let errors = load_and_validate_str("").expect_err("identifiers are required");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::MissingKey { key } if key == "assistant.assistant_id")));
}

#[test]
fn minimal_config_validates() {
    let config = load_and_validate_str(MINIMAL).expect("minimal config should validate");
    assert_eq!(config.assistant.assistant_id, "asst_test");
}

/// A typo in a known section is reported with a suggestion.
#[test]
fn unknown_key_produces_suggestion() {
    let toml = r#"
[assistant]
asistant_id = "asst_1"
"#;
    let errors = load_and_validate_str(toml).expect_err("typo should be rejected");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("expected an UnknownKey diagnostic");
    assert_eq!(unknown.0, "asistant_id");
    assert_eq!(unknown.1.as_deref(), Some("assistant_id"));
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[email]
smtp_host = "smtp.example.com"
"#;
    let err = load_config_from_str(toml).expect_err("unknown section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("email"),
        "error should mention unknown field, got: {err_str}"
    );
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[server]
port = "eighty"
"#;
    let errors = load_and_validate_str(toml).expect_err("string port should be rejected");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_))));
}

/// `ASKDESK_*` variables override file values, including underscore-bearing keys.
#[test]
fn env_vars_override_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("askdesk-test.toml", MINIMAL)?;
        jail.set_env("ASKDESK_ASSISTANT_ASSISTANT_ID", "asst_from_env");
        jail.set_env("ASKDESK_POLL_MAX_WAIT_SECS", "7");
        jail.set_env("ASKDESK_LEDGER_PATH", "env.csv");

        let config = load_and_validate_path(std::path::Path::new("askdesk-test.toml"))
            .expect("config should validate");
        assert_eq!(config.assistant.assistant_id, "asst_from_env");
        assert_eq!(config.assistant.vector_store_ids, vec!["vs_test"]);
        assert_eq!(config.poll.max_wait_secs, 7);
        assert_eq!(config.ledger.path, "env.csv");
        Ok(())
    });
}

/// Serialized defaults round-trip through TOML.
#[test]
fn defaults_serialize_to_toml() {
    let rendered = toml::to_string(&AskdeskConfig::default()).expect("defaults serialize");
    let parsed = load_config_from_str(&rendered).expect("rendered defaults parse back");
    assert_eq!(parsed.poll.max_attempts, 120);
}

/// The working-directory file is picked up and typos in it are suggested.
#[test]
fn local_file_is_loaded_and_typos_are_suggested() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("askdesk.toml", MINIMAL)?;
        let config = askdesk_config::load_and_validate().expect("local file should validate");
        assert_eq!(config.assistant.vector_store_ids, vec!["vs_test"]);

        jail.create_file("askdesk.toml", &format!("{MINIMAL}\n[server]\nprot = 9000\n"))?;
        let errors = askdesk_config::load_and_validate().expect_err("typo should fail");
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "prot" && suggestion.as_deref() == Some("port")
        )));
        Ok(())
    });
}

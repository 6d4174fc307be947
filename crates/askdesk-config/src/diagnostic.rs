// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with "did you mean?" suggestions.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(askdesk::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(askdesk::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A required configuration key is missing or empty.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(askdesk::config::missing_key),
        help("set `{key}` in askdesk.toml or the matching ASKDESK_ environment variable")
    )]
    MissingKey { key: String },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(askdesk::config::validation))]
    Validation { message: String },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(askdesk::config::other))]
    Other(String),
}

fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Converts a `figment::Error` into one diagnostic per underlying failure.
///
/// `toml_sources` holds `(path, content)` pairs; when an unknown key came
/// from one of them, the diagnostic points at the offending line.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, toml_sources))
        .collect()
}

fn convert(error: &figment::Error, toml_sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    let dotted_path = error.path.join(".");
    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let (span, src) = locate(error, field, toml_sources).unzip();
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, expected),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: if dotted_path.is_empty() {
                field.to_string()
            } else {
                format!("{dotted_path}.{field}")
            },
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: dotted_path,
            detail: format!("found {actual}, expected {expected}"),
            expected: expected.to_string(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Finds the file an error came from and the span of `field` inside it.
fn locate(
    error: &figment::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let figment::Source::File(origin) = error.metadata.as_ref()?.source.as_ref()? else {
        return None;
    };
    let origin = origin.display().to_string();
    let (path, content) = toml_sources.iter().find(|(path, _)| *path == origin)?;

    let offset = find_key_offset(content, &error.path, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(path, content.clone()),
    ))
}

/// Byte offset of `field` as a key in TOML `content`.
///
/// When `path` names a section, only lines after its `[section]` header are
/// searched.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let mut offset = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    for line in content[offset..].split_inclusive('\n') {
        let key = line.trim_start();
        let indent = line.len() - key.len();
        let is_key = key
            .strip_prefix(field)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c == '=' || c.is_whitespace());
        if is_key {
            return Some(offset + indent);
        }
        offset += line.len();
    }

    None
}

/// Closest valid key by Jaro-Winkler similarity, above [`SUGGESTION_THRESHOLD`].
pub fn suggest_key<S: AsRef<str>>(unknown: &str, valid_keys: &[S]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key.as_ref()), key.as_ref()))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints each error to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut report = String::new();
        match handler.render_report(&mut report, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{report}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_assistant_id_for_typo() {
        let valid = &["assistant_id", "vector_store_ids", "api_key", "base_url"];
        assert_eq!(
            suggest_key("asistant_id", valid),
            Some("assistant_id".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["interval_ms", "max_wait_secs", "max_attempts"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn find_key_offset_in_section() {
        let content = "[server]\nhots = \"0.0.0.0\"\n";
        let path = vec!["server".to_string()];
        let o = find_key_offset(content, &path, "hots").unwrap();
        assert_eq!(&content[o..o + 4], "hots");
    }

    #[test]
    fn find_key_offset_skips_longer_keys() {
        let content = "[poll]\ninterval_ms_extra = 1\ninterval_ms = 5\n";
        let path = vec!["poll".to_string()];
        let o = find_key_offset(content, &path, "interval_ms").unwrap();
        assert!(content[o..].starts_with("interval_ms = 5"));
    }

    #[test]
    fn find_key_offset_missing_section() {
        let content = "[poll]\ninterval_ms = 5\n";
        let path = vec!["server".to_string()];
        assert!(find_key_offset(content, &path, "interval_ms").is_none());
    }
}

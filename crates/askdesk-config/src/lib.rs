// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for askdesk.
//!
//! Settings come from layered TOML files and `ASKDESK_*` environment
//! variables. Unknown keys are rejected, and every problem is reported at
//! once as a miette diagnostic, with a suggestion when a key looks like a typo.
//!
//! # Usage
//!
//! ```no_run
//! use askdesk_config::load_and_validate;
//!
//! let Ok(config) = load_and_validate() else { return };
//! println!("assistant: {}", config.assistant.assistant_id);
//! ```

use std::path::Path;

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{config_files, load_config, load_config_from_path, load_config_from_str};
pub use model::AskdeskConfig;

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<AskdeskConfig, Vec<ConfigError>> {
    validated(loader::load_config(), || {
        loader::config_files()
            .into_iter()
            .filter_map(|path| read_source(&path))
            .collect()
    })
}

/// Load configuration from a specific TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<AskdeskConfig, Vec<ConfigError>> {
    validated(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<AskdeskConfig, Vec<ConfigError>> {
    validated(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Runs validation on a loaded config, or turns a load failure into
/// diagnostics. `sources` is only read on failure, to attach spans.
fn validated(
    loaded: Result<AskdeskConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<AskdeskConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    Some((path.display().to_string(), content))
}

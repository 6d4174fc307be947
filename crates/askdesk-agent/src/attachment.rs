// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staging of uploaded attachments.
//!
//! The upload API takes a file path, so payloads are written to a named
//! temporary file first. The file is removed when the returned handle drops.

use std::io::Write;
use std::path::Path;

use askdesk_core::AskdeskError;
use tempfile::NamedTempFile;

/// A file submitted alongside a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Client-supplied filename.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Name used when the client sends a file without one.
pub const FALLBACK_FILENAME: &str = "upload";

impl Attachment {
    /// A blank filename is replaced by [`FALLBACK_FILENAME`].
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let filename = match filename.trim() {
            "" => FALLBACK_FILENAME.to_string(),
            trimmed => trimmed.to_string(),
        };
        Self { filename, bytes }
    }

    /// An attachment without content counts as absent.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Original extension including the dot, or empty.
    fn suffix(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }
}

/// Writes the payload to a temporary file that keeps the original extension.
pub async fn stage(attachment: &Attachment) -> Result<NamedTempFile, AskdeskError> {
    let suffix = attachment.suffix();
    let bytes = attachment.bytes.clone();

    tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("askdesk-upload-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(file)
    })
    .await
    .map_err(|e| AskdeskError::Upload {
        message: format!("staging task failed: {e}"),
        source: Some(Box::new(e)),
    })?
    .map_err(|e| AskdeskError::Upload {
        message: format!("failed to stage attachment: {e}"),
        source: Some(Box::new(e)),
    })
}

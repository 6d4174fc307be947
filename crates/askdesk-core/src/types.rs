// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation, run, and record types shared across the askdesk workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AskdeskError;
use strum::{Display, EnumString};

/// Opaque conversation identifier issued by the assistant service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    /// Longest identifier accepted from a client.
    pub const MAX_LEN: usize = 128;

    /// Parses a client-supplied thread id.
    ///
    /// Surrounding whitespace is ignored. Anything other than ASCII letters,
    /// digits, `_` and `-` is rejected, since the id ends up in request paths.
    pub fn parse(raw: &str) -> Result<Self, AskdeskError> {
        let id = raw.trim();
        let well_formed = !id.is_empty()
            && id.len() <= Self::MAX_LEN
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if well_formed {
            Ok(Self(id.to_string()))
        } else {
            Err(AskdeskError::InvalidInput(format!(
                "malformed conversation id {id:?}"
            )))
        }
    }
}

/// Opaque identifier of one remote run against a thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

/// Opaque identifier of a file stored by the assistant service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub String);

macro_rules! id_accessors {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                /// Returns the raw identifier.
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

id_accessors!(ThreadId, RunId, FileId);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Assistant,
    Ledger,
    Delivery,
}

/// Author of a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Capitalized label used in transcripts ("User", "Assistant").
    pub fn title(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// A reference embedded in a text segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    /// Points at a source document, optionally with the quoted excerpt.
    FileCitation {
        file_id: FileId,
        quote: Option<String>,
    },
    /// Any other annotation kind (file paths, URLs, ...). Ignored by extraction.
    Other,
}

/// One segment of a message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSegment {
    Text {
        value: String,
        annotations: Vec<Annotation>,
    },
    /// Non-text content (images, unknown kinds).
    Other,
}

impl ContentSegment {
    /// Convenience constructor for a text segment without annotations.
    pub fn text(value: impl Into<String>) -> Self {
        ContentSegment::Text {
            value: value.into(),
            annotations: Vec::new(),
        }
    }
}

/// A message as returned by the assistant service. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    /// Creation time in unix seconds, as reported by the service.
    pub created_at: i64,
    pub content: Vec<ContentSegment>,
}

impl Message {
    /// Text of the first text segment, if the message has one.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|segment| match segment {
            ContentSegment::Text { value, .. } => Some(value.as_str()),
            ContentSegment::Other => None,
        })
    }

    /// Iterates over the annotations of every text segment.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.content
            .iter()
            .filter_map(|segment| match segment {
                ContentSegment::Text { annotations, .. } => Some(annotations),
                ContentSegment::Other => None,
            })
            .flatten()
    }
}

/// Lifecycle state of a remote run.
///
/// Only [`RunState::Completed`] and [`RunState::Failed`] are terminal. Any
/// other status the service reports is treated as still pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Queued,
    InProgress,
    Completed,
    Failed,
    Other(String),
}

impl RunState {
    /// Maps a remote status string onto a run state.
    pub fn from_status(status: &str) -> Self {
        match status {
            "queued" => RunState::Queued,
            "in_progress" => RunState::InProgress,
            "completed" => RunState::Completed,
            "failed" => RunState::Failed,
            other => RunState::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunState::Queued => "queued",
            RunState::InProgress => "in_progress",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
            RunState::Other(s) => s,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run that has just been dispatched, with the state the service reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedRun {
    pub thread_id: ThreadId,
    pub run_id: RunId,
    pub state: RunState,
}

/// A source reference extracted from an assistant answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source_file_id: FileId,
    /// Resolved filename, or `File ID <id>` when the lookup failed.
    pub label: String,
    pub quote: Option<String>,
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.quote {
            Some(quote) if !quote.is_empty() => write!(f, "{} (\"{}\")", self.label, quote),
            _ => f.write_str(&self.label),
        }
    }
}

/// One row of the interaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// ISO-8601 local timestamp.
    pub timestamp: String,
    pub thread_id: String,
    pub question: String,
    pub answer: String,
}

impl LogRecord {
    /// Creates a record stamped with the current local time.
    pub fn now(
        thread_id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S%.6f%:z")
                .to_string(),
            thread_id: thread_id.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Aggregate view over the interaction log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    /// Number of distinct thread ids.
    pub distinct_threads: usize,
    /// Number of logged turns.
    pub total_questions: usize,
    /// Most recent rows, oldest first.
    pub recent: Vec<LogRecord>,
}

impl StatsReport {
    pub fn is_empty(&self) -> bool {
        self.total_questions == 0
    }
}

/// A conversation packaged for hand-off to a human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscalationRecord {
    pub thread_id: ThreadId,
    /// Best-effort summary; a placeholder when summarization failed.
    pub summary: String,
    /// Full transcript, one `Role: text` line per message.
    pub transcript: String,
}

impl EscalationRecord {
    /// Plain-text note suitable for an email body or ticket.
    pub fn note(&self) -> String {
        format!(
            "Escalated conversation (Thread {}):\n\nSummary:\n{}\n\nFull chat history:\n{}\n",
            self.thread_id, self.summary, self.transcript
        )
    }
}

// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Answer, citation, and transcript extraction from thread history.

use std::collections::{HashMap, HashSet};

use askdesk_core::traits::AssistantClient;
use askdesk_core::types::{Annotation, Citation, FileId, Message, Role};
use tracing::warn;

/// Answer shown when a run produced no usable assistant text.
pub const NO_ANSWER: &str = "[No answer returned]";

/// Sorts messages by creation time. Stable, so equal timestamps keep server order.
pub fn sort_chronologically(messages: &mut [Message]) {
    messages.sort_by_key(|message| message.created_at);
}

/// The last assistant message carrying text, scanning from the end.
///
/// Expects chronologically sorted input.
pub fn latest_answer(messages: &[Message]) -> Option<&Message> {
    messages
        .iter()
        .rev()
        .find(|message| message.role == Role::Assistant && message.first_text().is_some())
}

/// Text of [`latest_answer`], or [`NO_ANSWER`].
pub fn answer_text(messages: &[Message]) -> String {
    latest_answer(messages)
        .and_then(Message::first_text)
        .unwrap_or(NO_ANSWER)
        .to_string()
}

/// Resolves the file citations of `message` into labelled references.
///
/// Each distinct file id is looked up once. A failed lookup falls back to the
/// label `File ID <id>` and never fails the call. Entries with the same
/// `(label, quote)` are reported once, in first-occurrence order.
pub async fn collect_citations(client: &dyn AssistantClient, message: &Message) -> Vec<Citation> {
    let mut labels: HashMap<FileId, String> = HashMap::new();
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    let mut citations = Vec::new();

    for annotation in message.annotations() {
        let Annotation::FileCitation { file_id, quote } = annotation else {
            continue;
        };

        let label = match labels.get(file_id) {
            Some(label) => label.clone(),
            None => {
                let label = match client.get_file_metadata(file_id).await {
                    Ok(filename) => filename,
                    Err(e) => {
                        warn!(file_id = %file_id, error = %e, "citation lookup failed, using file id");
                        fallback_label(file_id)
                    }
                };
                labels.insert(file_id.clone(), label.clone());
                label
            }
        };

        if seen.insert((label.clone(), quote.clone())) {
            citations.push(Citation {
                source_file_id: file_id.clone(),
                label,
                quote: quote.clone(),
            });
        }
    }

    citations
}

/// Label used when a cited file cannot be resolved.
pub fn fallback_label(file_id: &FileId) -> String {
    format!("File ID {file_id}")
}

/// One rendered line of a conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
}

/// Builds the transcript of sorted messages. Messages without text are skipped.
pub fn transcript(messages: &[Message]) -> Vec<TranscriptEntry> {
    messages
        .iter()
        .filter_map(|message| {
            message.first_text().map(|text| TranscriptEntry {
                role: message.role,
                text: text.to_string(),
            })
        })
        .collect()
}

/// Plain-text transcript, one `Role: text` line per entry.
pub fn render_plain(entries: &[TranscriptEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}: {}", entry.role.title(), entry.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdesk_core::types::ContentSegment;
    use askdesk_test_utils::ScriptedAssistant;

    fn message(id: &str, role: Role, created_at: i64, text: &str) -> Message {
        Message {
            id: id.into(),
            role,
            created_at,
            content: vec![ContentSegment::text(text)],
        }
    }

    fn cited(citations: &[(&str, Option<&str>)]) -> Message {
        Message {
            id: "msg_cited".into(),
            role: Role::Assistant,
            created_at: 10,
            content: vec![ContentSegment::Text {
                value: "answer".into(),
                annotations: citations
                    .iter()
                    .map(|(id, quote)| Annotation::FileCitation {
                        file_id: FileId(id.to_string()),
                        quote: quote.map(str::to_string),
                    })
                    .collect(),
            }],
        }
    }

    #[test]
    fn sort_is_stable_for_equal_timestamps() {
        let mut messages = vec![
            message("c", Role::Assistant, 3, "third"),
            message("a1", Role::User, 1, "first"),
            message("a2", Role::Assistant, 1, "also first"),
            message("b", Role::User, 2, "second"),
        ];
        sort_chronologically(&mut messages);
        let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a2", "b", "c"]);
    }

    #[test]
    fn latest_answer_skips_textless_assistant_messages() {
        let messages = vec![
            message("1", Role::User, 1, "q"),
            message("2", Role::Assistant, 2, "real answer"),
            Message {
                id: "3".into(),
                role: Role::Assistant,
                created_at: 3,
                content: vec![ContentSegment::Other],
            },
            message("4", Role::User, 4, "follow-up"),
        ];
        assert_eq!(latest_answer(&messages).map(|m| m.id.as_str()), Some("2"));
        assert_eq!(answer_text(&messages), "real answer");
    }

    #[test]
    fn no_assistant_message_yields_sentinel() {
        let messages = vec![message("1", Role::User, 1, "q")];
        assert!(latest_answer(&messages).is_none());
        assert_eq!(answer_text(&messages), NO_ANSWER);
        assert_eq!(answer_text(&[]), NO_ANSWER);
    }

    #[test]
    fn plain_transcript_uses_role_titles() {
        let messages = vec![
            message("1", Role::User, 1, "How do I reset?"),
            message("2", Role::Assistant, 2, "Hold the button."),
        ];
        assert_eq!(
            render_plain(&transcript(&messages)),
            "User: How do I reset?\nAssistant: Hold the button."
        );
    }

    #[tokio::test]
    async fn identical_label_and_quote_are_reported_once() {
        let assistant = ScriptedAssistant::new()
            .with_file("file-a", "manual.pdf")
            .with_file("file-b", "manual.pdf");
        let message = cited(&[
            ("file-a", Some("torque 40 Nm")),
            ("file-b", Some("torque 40 Nm")),
            ("file-a", Some("torque 40 Nm")),
        ]);

        let citations = collect_citations(&assistant, &message).await;
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].label, "manual.pdf");
        assert_eq!(citations[0].source_file_id, FileId("file-a".into()));
    }

    #[tokio::test]
    async fn different_quotes_are_kept_in_order() {
        let assistant = ScriptedAssistant::new().with_file("file-a", "manual.pdf");
        let message = cited(&[("file-a", Some("second")), ("file-a", None), ("file-a", Some("first"))]);

        let citations = collect_citations(&assistant, &message).await;
        let quotes: Vec<_> = citations.iter().map(|c| c.quote.as_deref()).collect();
        assert_eq!(quotes, [Some("second"), None, Some("first")]);
    }

    #[tokio::test]
    async fn failed_lookup_falls_back_to_file_id() {
        let assistant = ScriptedAssistant::new()
            .with_file("file-ok", "guide.pdf")
            .with_failing_file("file-broken");
        let message = cited(&[("file-broken", None), ("file-ok", None)]);

        let citations = collect_citations(&assistant, &message).await;
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].label, "File ID file-broken");
        assert!(citations[0].label.contains("file-broken"));
        assert_eq!(citations[1].label, "guide.pdf");
    }
}

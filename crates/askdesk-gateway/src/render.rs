// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-side HTML rendering.
//!
//! Every piece of user or remote text goes through [`escape_html`] before
//! being interpolated.

use std::fmt::Write;

use askdesk_agent::{EscalationOutcome, TranscriptEntry, TurnOutcome};
use askdesk_core::types::{StatsReport, ThreadId};

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }}
.entry, .answer {{ white-space: pre-wrap; }}
.error {{ color: #a00; }}
table {{ border-collapse: collapse; width: 100%; }}
td, th {{ border: 1px solid #ccc; padding: 0.25rem; text-align: left; vertical-align: top; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// Question form. `thread_id` is empty for a new conversation.
fn question_form(thread_id: &str) -> String {
    format!(
        r#"<form action="/ask" method="post" enctype="multipart/form-data">
<input type="hidden" name="thread_id" value="{thread_id}">
<p><textarea name="question" rows="4" cols="60" required></textarea></p>
<p><input type="file" name="file"></p>
<p><button type="submit">Ask</button></p>
</form>"#,
        thread_id = escape_html(thread_id),
    )
}

fn escalate_form(thread_id: &ThreadId) -> String {
    format!(
        r#"<form action="/escalate" method="post">
<input type="hidden" name="thread_id" value="{}">
<button type="submit">Escalate to a human</button>
</form>"#,
        escape_html(thread_id.as_str()),
    )
}

fn nav() -> &'static str {
    r#"<p><a href="/">New conversation</a> | <a href="/stats">Statistics</a></p>"#
}

fn transcript_html(entries: &[TranscriptEntry]) -> String {
    if entries.is_empty() {
        return "<p>No messages yet.</p>".to_string();
    }
    let mut html = String::new();
    for entry in entries {
        let _ = writeln!(
            html,
            r#"<p class="entry"><strong>{}:</strong> {}</p>"#,
            entry.role.title(),
            escape_html(&entry.text)
        );
    }
    html
}

/// Landing page with an empty question form.
pub fn index_page() -> String {
    layout(
        "Ask the knowledge base",
        &format!(
            "<h1>Ask the knowledge base</h1>\n{}\n{}",
            question_form(""),
            nav()
        ),
    )
}

/// Result of a finished turn.
pub fn answer_page(outcome: &TurnOutcome) -> String {
    let references = if outcome.citations.is_empty() {
        "<p>No references.</p>".to_string()
    } else {
        let items: String = outcome
            .citations
            .iter()
            .map(|citation| format!("<li>{}</li>\n", escape_html(&citation.to_string())))
            .collect();
        format!("<ul>\n{items}</ul>")
    };

    let body = format!(
        r#"<h1>Conversation</h1>
<h2>History</h2>
{transcript}
<h2>Your question</h2>
<p class="entry">{question}</p>
<h2>Answer</h2>
<p class="answer">{answer}</p>
<h2>References</h2>
{references}
<h2>Ask a follow-up</h2>
{form}
{escalate}
{nav}"#,
        transcript = transcript_html(&outcome.transcript),
        question = escape_html(&outcome.question),
        answer = escape_html(&outcome.answer),
        form = question_form(outcome.thread_id.as_str()),
        escalate = escalate_form(&outcome.thread_id),
        nav = nav(),
    );
    layout("Answer", &body)
}

/// Page shown when a request could not be completed.
///
/// Keeps the conversation going when the thread is known.
pub fn degraded_page(title: &str, message: &str, thread_id: Option<&ThreadId>) -> String {
    let continuation = match thread_id {
        Some(thread_id) => format!(
            "<h2>Try again</h2>\n{}\n{}",
            question_form(thread_id.as_str()),
            escalate_form(thread_id)
        ),
        None => String::new(),
    };
    let body = format!(
        "<h1>{}</h1>\n<p class=\"error\">{}</p>\n{continuation}\n{}",
        escape_html(title),
        escape_html(message),
        nav()
    );
    layout(title, &body)
}

/// Result of an escalation.
pub fn escalation_page(outcome: &EscalationOutcome) -> String {
    let delivery = if outcome.delivered {
        "Your conversation has been forwarded to a human agent."
    } else {
        "Your conversation could not be forwarded automatically. Please contact support directly."
    };
    let body = format!(
        r#"<h1>Escalation</h1>
<p>{delivery}</p>
<p>Thread: {thread}</p>
<h2>Summary</h2>
<p class="answer">{summary}</p>
<h2>Full conversation</h2>
{transcript}
{nav}"#,
        thread = escape_html(outcome.thread_id.as_str()),
        summary = escape_html(&outcome.summary),
        transcript = transcript_html(&outcome.transcript),
        nav = nav(),
    );
    layout("Escalation", &body)
}

/// Usage overview. An empty report renders a "No data yet" notice.
pub fn stats_page(report: &StatsReport) -> String {
    if report.is_empty() {
        return layout(
            "Statistics",
            &format!("<h1>Statistics</h1>\n<p>No data yet.</p>\n{}", nav()),
        );
    }

    let mut rows = String::new();
    for record in &report.recent {
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&record.timestamp),
            escape_html(&record.thread_id),
            escape_html(&record.question),
            escape_html(&record.answer)
        );
    }

    let body = format!(
        r#"<h1>Statistics</h1>
<p>Conversations: {threads}</p>
<p>Questions asked: {questions}</p>
<h2>Most recent</h2>
<table>
<tr><th>Time</th><th>Thread</th><th>Question</th><th>Answer</th></tr>
{rows}</table>
{nav}"#,
        threads = report.distinct_threads,
        questions = report.total_questions,
        nav = nav(),
    );
    layout("Statistics", &body)
}

/// Stats page shown when the log could not be read.
pub fn stats_error_page(message: &str) -> String {
    layout(
        "Statistics",
        &format!(
            "<h1>Statistics</h1>\n<p class=\"error\">Could not read statistics: {}</p>\n{}",
            escape_html(message),
            nav()
        ),
    )
}

// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end turn and escalation tests against scripted adapters.

use std::sync::Arc;
use std::time::Duration;

use askdesk_agent::{
    Attachment, EscalationHandler, NO_ANSWER, PollPolicy, SUMMARY_PROMPT, SUMMARY_UNAVAILABLE,
    TurnOrchestrator, TurnRequest, TurnStage,
};
use askdesk_core::types::{Role, RunState, ThreadId};
use askdesk_core::AskdeskError;
use askdesk_test_utils::{
    FailingLog, RecordingDelivery, RecordingLog, ScriptedAnswer, ScriptedAssistant,
};
use tokio_util::sync::CancellationToken;

fn fast_policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(10),
        max_wait: Duration::from_secs(5),
        max_attempts: 5,
    }
}

fn orchestrator(assistant: &Arc<ScriptedAssistant>, log: &Arc<RecordingLog>) -> TurnOrchestrator {
    TurnOrchestrator::new(
        assistant.clone(),
        log.clone(),
        vec!["vs_manuals".into()],
        fast_policy(),
        CancellationToken::new(),
    )
}

fn escalation(
    assistant: &Arc<ScriptedAssistant>,
    delivery: &Arc<RecordingDelivery>,
) -> EscalationHandler {
    EscalationHandler::new(
        assistant.clone(),
        delivery.clone(),
        fast_policy(),
        CancellationToken::new(),
    )
}

#[tokio::test]
async fn new_turn_creates_thread_and_logs_answer() {
    let assistant = Arc::new(
        ScriptedAssistant::new().with_answer(ScriptedAnswer::text("Hold reset for 5 seconds.")),
    );
    let log = Arc::new(RecordingLog::new());

    let outcome = orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("How do I reset the unit?"))
        .await
        .unwrap();

    assert!(!outcome.thread_id.as_str().is_empty());
    assert_eq!(outcome.answer, "Hold reset for 5 seconds.");
    assert_eq!(outcome.run_state, RunState::Completed);

    let records = log.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].thread_id, outcome.thread_id.as_str());
    assert_eq!(records[0].question, "How do I reset the unit?");
    assert_eq!(records[0].answer, "Hold reset for 5 seconds.");
}

#[tokio::test]
async fn consecutive_turns_share_thread_in_chronological_order() {
    let assistant = Arc::new(ScriptedAssistant::new());
    let log = Arc::new(RecordingLog::new());
    let orchestrator = orchestrator(&assistant, &log);

    let first = orchestrator.run_turn(TurnRequest::new("q1")).await.unwrap();
    let thread = first.thread_id.as_str().to_string();
    orchestrator
        .run_turn(TurnRequest::new("q2").on_thread(thread.clone()))
        .await
        .unwrap();
    let third = orchestrator
        .run_turn(TurnRequest::new("q3").on_thread(thread.clone()))
        .await
        .unwrap();

    assert_eq!(third.thread_id.as_str(), thread);
    assert_eq!(assistant.thread_count().await, 1);

    let lines: Vec<(Role, &str)> = third
        .transcript
        .iter()
        .map(|entry| (entry.role, entry.text.as_str()))
        .collect();
    assert_eq!(
        lines,
        [
            (Role::User, "q1"),
            (Role::Assistant, "Answer 1"),
            (Role::User, "q2"),
            (Role::Assistant, "Answer 2"),
            (Role::User, "q3"),
            (Role::Assistant, "Answer 3"),
        ]
    );
    assert_eq!(third.answer, "Answer 3");
    assert_eq!(log.records().await.len(), 3);
}

#[tokio::test]
async fn blank_thread_id_starts_new_conversation() {
    let assistant = Arc::new(ScriptedAssistant::new());
    let log = Arc::new(RecordingLog::new());
    let orchestrator = orchestrator(&assistant, &log);

    orchestrator.run_turn(TurnRequest::new("a")).await.unwrap();
    orchestrator
        .run_turn(TurnRequest::new("b").on_thread("  "))
        .await
        .unwrap();
    assert_eq!(assistant.thread_count().await, 2);
}

#[tokio::test]
async fn citations_are_deduplicated_and_fall_back_to_file_id() {
    let assistant = Arc::new(
        ScriptedAssistant::new()
            .with_file("file-a", "manual.pdf")
            .with_file("file-b", "manual.pdf")
            .with_failing_file("file-x")
            .with_answer(
                ScriptedAnswer::text("Torque is 40 Nm.")
                    .cite("file-a", Some("40 Nm"))
                    .cite("file-b", Some("40 Nm"))
                    .cite("file-x", None),
            ),
    );
    let log = Arc::new(RecordingLog::new());

    let outcome = orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("torque?"))
        .await
        .unwrap();

    let labels: Vec<_> = outcome.citations.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["manual.pdf", "File ID file-x"]);
}

#[tokio::test]
async fn failed_run_yields_sentinel_but_keeps_transcript() {
    let assistant = Arc::new(
        ScriptedAssistant::new().with_run_script(vec![RunState::Queued, RunState::Failed]),
    );
    let log = Arc::new(RecordingLog::new());

    let outcome = orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("will this fail?"))
        .await
        .unwrap();

    assert_eq!(outcome.run_state, RunState::Failed);
    assert_eq!(outcome.answer, NO_ANSWER);
    assert!(outcome.citations.is_empty());
    assert_eq!(outcome.transcript.len(), 1);
    assert_eq!(outcome.transcript[0].text, "will this fail?");
    assert_eq!(log.records().await[0].answer, NO_ANSWER);
}

#[tokio::test]
async fn dispatch_failure_is_logged_without_thread() {
    let assistant = Arc::new(ScriptedAssistant::new().failing_dispatch());
    let log = Arc::new(RecordingLog::new());

    let err = orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("anyone there?"))
        .await
        .unwrap_err();

    assert_eq!(err.stage, TurnStage::Dispatch);
    assert!(err.thread_id.is_none());
    assert!(matches!(err.source, AskdeskError::RemoteUnavailable { .. }));

    let records = log.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].thread_id, "");
    assert_eq!(records[0].answer, NO_ANSWER);
}

#[tokio::test]
async fn dispatch_failure_on_existing_thread_keeps_thread_id() {
    let assistant = Arc::new(ScriptedAssistant::new());
    let log = Arc::new(RecordingLog::new());

    let err = orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("hello again").on_thread("thread_gone"))
        .await
        .unwrap_err();
    assert_eq!(err.thread_id, Some(ThreadId("thread_gone".into())));
    assert_eq!(log.records().await[0].thread_id, "thread_gone");
}

#[tokio::test]
async fn poll_timeout_is_logged_and_reported_with_thread() {
    let assistant = Arc::new(
        ScriptedAssistant::new().with_run_script(vec![RunState::Queued, RunState::InProgress]),
    );
    let log = Arc::new(RecordingLog::new());

    let err = orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("slow question"))
        .await
        .unwrap_err();

    assert_eq!(err.stage, TurnStage::Polling);
    assert!(matches!(err.source, AskdeskError::Timeout { .. }));
    let thread = err.thread_id.clone().unwrap();
    assert_eq!(assistant.poll_count().await, 5);
    assert_eq!(assistant.cancelled_runs().await.len(), 1);

    let records = log.records().await;
    assert_eq!(records[0].thread_id, thread.as_str());
    assert_eq!(records[0].answer, NO_ANSWER);
}

#[tokio::test]
async fn history_failure_is_extract_error() {
    let assistant = Arc::new(ScriptedAssistant::new().failing_history());
    let log = Arc::new(RecordingLog::new());

    let err = orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("q"))
        .await
        .unwrap_err();
    assert_eq!(err.stage, TurnStage::Extract);
    assert!(err.thread_id.is_some());
    assert_eq!(log.records().await.len(), 1);
}

#[tokio::test]
async fn unwritable_log_does_not_change_outcome() {
    let healthy = Arc::new(ScriptedAssistant::new().with_answer(ScriptedAnswer::text("same")));
    let broken = Arc::new(ScriptedAssistant::new().with_answer(ScriptedAnswer::text("same")));

    let with_log = orchestrator(&healthy, &Arc::new(RecordingLog::new()))
        .run_turn(TurnRequest::new("q"))
        .await
        .unwrap();
    let without_log = TurnOrchestrator::new(
        broken.clone(),
        Arc::new(FailingLog),
        Vec::new(),
        fast_policy(),
        CancellationToken::new(),
    )
    .run_turn(TurnRequest::new("q"))
    .await
    .unwrap();

    assert_eq!(with_log, without_log);
}

#[tokio::test]
async fn attachment_is_uploaded_and_staged_file_removed() {
    let assistant = Arc::new(ScriptedAssistant::new());
    let log = Arc::new(RecordingLog::new());

    orchestrator(&assistant, &log)
        .run_turn(
            TurnRequest::new("what does this label say?")
                .with_attachment(Attachment::new("label.png", b"png-bytes".to_vec())),
        )
        .await
        .unwrap();

    let uploads = assistant.uploads().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].filename, "label.png");
    assert_eq!(uploads[0].bytes, b"png-bytes");
    assert_eq!(
        uploads[0].staged_path.extension().and_then(|e| e.to_str()),
        Some("png")
    );
    assert!(!uploads[0].staged_path.exists());
    assert_eq!(assistant.attached_files().await, vec![uploads[0].file_id.clone()]);
}

#[tokio::test]
async fn empty_attachment_is_ignored() {
    let assistant = Arc::new(ScriptedAssistant::new());
    let log = Arc::new(RecordingLog::new());

    orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("q").with_attachment(Attachment::new("", Vec::new())))
        .await
        .unwrap();
    assert!(assistant.uploads().await.is_empty());
    assert!(assistant.attached_files().await.is_empty());
}

#[tokio::test]
async fn nameless_attachment_is_uploaded_under_fallback_name() {
    let assistant = Arc::new(ScriptedAssistant::new());
    let log = Arc::new(RecordingLog::new());

    orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("q").with_attachment(Attachment::new("", b"notes".to_vec())))
        .await
        .unwrap();

    let uploads = assistant.uploads().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].filename, "upload");
    assert_eq!(uploads[0].bytes, b"notes");
}

#[tokio::test]
async fn malformed_thread_id_is_rejected_before_dispatch() {
    let assistant = Arc::new(ScriptedAssistant::new());
    let log = Arc::new(RecordingLog::new());

    let err = orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("q").on_thread("../files/file-secret?x="))
        .await
        .unwrap_err();

    assert!(matches!(err.source, AskdeskError::InvalidInput(_)));
    assert_eq!(err.thread_id, None);
    assert!(assistant.dispatched_questions().await.is_empty());
    assert!(log.records().await.is_empty());
}

#[tokio::test]
async fn upload_failure_aborts_turn_without_logging() {
    let assistant = Arc::new(ScriptedAssistant::new().failing_uploads());
    let log = Arc::new(RecordingLog::new());

    let err = orchestrator(&assistant, &log)
        .run_turn(
            TurnRequest::new("see attached")
                .with_attachment(Attachment::new("report.pdf", b"%PDF".to_vec())),
        )
        .await
        .unwrap_err();

    assert_eq!(err.stage, TurnStage::AttachFile);
    assert!(matches!(err.source, AskdeskError::Upload { .. }));
    assert!(assistant.dispatched_questions().await.is_empty());
    assert!(log.records().await.is_empty());

    let leftovers = std::fs::read_dir(std::env::temp_dir())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with("askdesk-upload-") && name.ends_with(".pdf")
        })
        .count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn escalation_delivers_summary_and_transcript() {
    let assistant = Arc::new(
        ScriptedAssistant::new()
            .with_answer(ScriptedAnswer::text("Replace the fuse."))
            .with_answer(ScriptedAnswer::text("User asked about a blown fuse.")),
    );
    let log = Arc::new(RecordingLog::new());
    let delivery = Arc::new(RecordingDelivery::new());

    let turn = orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("The fuse blew"))
        .await
        .unwrap();
    let outcome = escalation(&assistant, &delivery)
        .escalate(&turn.thread_id)
        .await
        .unwrap();

    assert_eq!(outcome.summary, "User asked about a blown fuse.");
    assert!(outcome.delivered);
    assert_eq!(outcome.transcript.len(), 2);
    assert_eq!(
        assistant.dispatched_questions().await.last().map(String::as_str),
        Some(SUMMARY_PROMPT)
    );

    let delivered = delivery.delivered().await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].thread_id, turn.thread_id);
    assert_eq!(
        delivered[0].transcript,
        "User: The fuse blew\nAssistant: Replace the fuse."
    );
}

#[tokio::test]
async fn failed_summary_run_uses_placeholder() {
    let assistant = Arc::new(ScriptedAssistant::new());
    let log = Arc::new(RecordingLog::new());
    let delivery = Arc::new(RecordingDelivery::new());

    let turn = orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("q"))
        .await
        .unwrap();
    assistant
        .push_run_script(vec![RunState::Queued, RunState::Failed])
        .await;

    let outcome = escalation(&assistant, &delivery)
        .escalate(&turn.thread_id)
        .await
        .unwrap();
    assert_eq!(outcome.summary, SUMMARY_UNAVAILABLE);
    assert_eq!(delivery.delivered().await[0].summary, SUMMARY_UNAVAILABLE);
}

#[tokio::test]
async fn delivery_failure_is_not_surfaced() {
    let assistant = Arc::new(ScriptedAssistant::new());
    let log = Arc::new(RecordingLog::new());
    let delivery = Arc::new(RecordingDelivery::failing());

    let turn = orchestrator(&assistant, &log)
        .run_turn(TurnRequest::new("q"))
        .await
        .unwrap();
    let outcome = escalation(&assistant, &delivery)
        .escalate(&turn.thread_id)
        .await
        .unwrap();
    assert!(!outcome.delivered);
    assert_eq!(delivery.delivered().await.len(), 1);
}

#[tokio::test]
async fn escalating_unknown_thread_fails() {
    let assistant = Arc::new(ScriptedAssistant::new());
    let delivery = Arc::new(RecordingDelivery::new());

    let err = escalation(&assistant, &delivery)
        .escalate(&ThreadId("thread_missing".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, AskdeskError::RemoteUnavailable { .. }));
    assert!(delivery.delivered().await.is_empty());
}

// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory assistant for deterministic turn tests.
//!
//! `ScriptedAssistant` implements `AssistantClient` over a thread store held
//! in memory. Each dispatched run follows a pre-loaded state script: the first
//! state is returned by dispatch, the rest are handed out one per poll. When a
//! run reaches `Completed`, the next scripted answer is appended to its thread.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use askdesk_core::traits::{AssistantClient, PluginAdapter};
use askdesk_core::types::{
    AdapterType, Annotation, ContentSegment, DispatchedRun, FileId, HealthStatus, Message, Role,
    RunId, RunState, ThreadId,
};
use askdesk_core::AskdeskError;

/// Answer text plus the citations attached to it.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAnswer {
    pub text: String,
    /// `(file_id, quote)` pairs rendered as file-citation annotations.
    pub citations: Vec<(String, Option<String>)>,
}

impl ScriptedAnswer {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    pub fn cite(mut self, file_id: &str, quote: Option<&str>) -> Self {
        self.citations
            .push((file_id.to_string(), quote.map(str::to_string)));
        self
    }
}

/// A file received through `upload_file`.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_id: FileId,
    pub filename: String,
    /// Path of the staged file at upload time.
    pub staged_path: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
struct ActiveRun {
    thread_id: String,
    remaining: VecDeque<RunState>,
    current: RunState,
    answered: bool,
}

#[derive(Debug, Default)]
struct State {
    threads: HashMap<String, Vec<Message>>,
    runs: HashMap<String, ActiveRun>,
    scripts: VecDeque<Vec<RunState>>,
    answers: VecDeque<ScriptedAnswer>,
    filenames: HashMap<String, String>,
    failing_files: HashSet<String>,
    uploads: Vec<UploadedFile>,
    poll_instants: Vec<Instant>,
    cancelled: Vec<RunId>,
    dispatched_questions: Vec<String>,
    attached: Vec<FileId>,
    fail_upload: bool,
    fail_dispatch: bool,
    fail_poll: bool,
    fail_list: bool,
    next_id: u64,
    clock: i64,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn push_message(&mut self, thread_id: &str, role: Role, segment: ContentSegment) {
        let id = self.next_id("msg");
        let created_at = self.tick();
        self.threads
            .entry(thread_id.to_string())
            .or_default()
            .push(Message {
                id,
                role,
                created_at,
                content: vec![segment],
            });
    }

    fn dispatch(
        &mut self,
        thread_id: String,
        question: &str,
        attachment: Option<&FileId>,
    ) -> Result<DispatchedRun, AskdeskError> {
        if self.fail_dispatch {
            return Err(AskdeskError::remote("scripted dispatch failure"));
        }

        self.push_message(&thread_id, Role::User, ContentSegment::text(question));
        self.dispatched_questions.push(question.to_string());
        self.attached.extend(attachment.cloned());

        let mut remaining: VecDeque<RunState> = self
            .scripts
            .pop_front()
            .unwrap_or_else(|| vec![RunState::Completed])
            .into();
        let current = remaining.pop_front().unwrap_or(RunState::Completed);

        let run_id = self.next_id("run");
        self.runs.insert(
            run_id.clone(),
            ActiveRun {
                thread_id: thread_id.clone(),
                remaining,
                current: current.clone(),
                answered: false,
            },
        );
        self.settle(&run_id);

        Ok(DispatchedRun {
            thread_id: ThreadId(thread_id),
            run_id: RunId(run_id),
            state: current,
        })
    }

    /// Appends the scripted answer once a run has completed.
    fn settle(&mut self, run_id: &str) {
        let Some(run) = self.runs.get_mut(run_id) else {
            return;
        };
        if run.current != RunState::Completed || run.answered {
            return;
        }
        run.answered = true;
        let thread_id = run.thread_id.clone();

        let answer = self.answers.pop_front().unwrap_or_else(|| {
            ScriptedAnswer::text(format!("Answer {}", self.dispatched_questions.len()))
        });
        let segment = ContentSegment::Text {
            value: answer.text,
            annotations: answer
                .citations
                .into_iter()
                .map(|(file_id, quote)| Annotation::FileCitation {
                    file_id: FileId(file_id),
                    quote,
                })
                .collect(),
        };
        self.push_message(&thread_id, Role::Assistant, segment);
    }
}

/// In-memory [`AssistantClient`] driven by scripts.
///
/// Runs without a script complete immediately with a default answer.
pub struct ScriptedAssistant {
    state: Mutex<State>,
}

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Queues the state script of the next dispatched run.
    pub fn with_run_script(mut self, states: Vec<RunState>) -> Self {
        self.state.get_mut().scripts.push_back(states);
        self
    }

    /// Queues the answer of the next run that completes.
    pub fn with_answer(mut self, answer: ScriptedAnswer) -> Self {
        self.state.get_mut().answers.push_back(answer);
        self
    }

    /// Registers a file id that resolves to `filename`.
    pub fn with_file(mut self, file_id: &str, filename: &str) -> Self {
        self.state
            .get_mut()
            .filenames
            .insert(file_id.to_string(), filename.to_string());
        self
    }

    /// Makes metadata lookups for `file_id` fail.
    pub fn with_failing_file(mut self, file_id: &str) -> Self {
        self.state
            .get_mut()
            .failing_files
            .insert(file_id.to_string());
        self
    }

    /// Makes every upload fail.
    pub fn failing_uploads(mut self) -> Self {
        self.state.get_mut().fail_upload = true;
        self
    }

    /// Makes every dispatch fail.
    pub fn failing_dispatch(mut self) -> Self {
        self.state.get_mut().fail_dispatch = true;
        self
    }

    /// Makes every poll fail.
    pub fn failing_polls(mut self) -> Self {
        self.state.get_mut().fail_poll = true;
        self
    }

    /// Makes message listing fail.
    pub fn failing_history(mut self) -> Self {
        self.state.get_mut().fail_list = true;
        self
    }

    /// Queues a run script on an already shared instance.
    pub async fn push_run_script(&self, states: Vec<RunState>) {
        self.state.lock().await.scripts.push_back(states);
    }

    /// Queues an answer on an already shared instance.
    pub async fn push_answer(&self, answer: ScriptedAnswer) {
        self.state.lock().await.answers.push_back(answer);
    }

    /// Instants at which `poll_run` was called, in call order.
    pub async fn poll_instants(&self) -> Vec<Instant> {
        self.state.lock().await.poll_instants.clone()
    }

    pub async fn poll_count(&self) -> usize {
        self.state.lock().await.poll_instants.len()
    }

    /// Runs for which `cancel_run` was requested.
    pub async fn cancelled_runs(&self) -> Vec<RunId> {
        self.state.lock().await.cancelled.clone()
    }

    pub async fn uploads(&self) -> Vec<UploadedFile> {
        self.state.lock().await.uploads.clone()
    }

    /// Questions passed to dispatch, in call order.
    pub async fn dispatched_questions(&self) -> Vec<String> {
        self.state.lock().await.dispatched_questions.clone()
    }

    /// File ids attached to dispatched questions, in call order.
    pub async fn attached_files(&self) -> Vec<FileId> {
        self.state.lock().await.attached.clone()
    }

    /// Stored messages of a thread, in insertion order.
    pub async fn thread_messages(&self, thread_id: &str) -> Vec<Message> {
        self.state
            .lock()
            .await
            .threads
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn thread_count(&self) -> usize {
        self.state.lock().await.threads.len()
    }
}

impl Default for ScriptedAssistant {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for ScriptedAssistant {
    fn name(&self) -> &str {
        "scripted-assistant"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Assistant
    }

    async fn health_check(&self) -> Result<HealthStatus, AskdeskError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl AssistantClient for ScriptedAssistant {
    async fn upload_file(&self, path: &Path, filename: &str) -> Result<FileId, AskdeskError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AskdeskError::Upload {
                message: format!("failed to read staged file: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut state = self.state.lock().await;
        if state.fail_upload {
            return Err(AskdeskError::Upload {
                message: "scripted upload failure".into(),
                source: None,
            });
        }
        let file_id = FileId(state.next_id("file"));
        state
            .filenames
            .insert(file_id.0.clone(), filename.to_string());
        state.uploads.push(UploadedFile {
            file_id: file_id.clone(),
            filename: filename.to_string(),
            staged_path: path.to_path_buf(),
            bytes,
        });
        Ok(file_id)
    }

    async fn start_conversation(
        &self,
        question: &str,
        _knowledge_sources: &[String],
        attachment: Option<&FileId>,
    ) -> Result<DispatchedRun, AskdeskError> {
        let mut state = self.state.lock().await;
        let thread_id = state.next_id("thread");
        state.dispatch(thread_id, question, attachment)
    }

    async fn continue_conversation(
        &self,
        thread_id: &ThreadId,
        question: &str,
        attachment: Option<&FileId>,
    ) -> Result<DispatchedRun, AskdeskError> {
        let mut state = self.state.lock().await;
        if !state.threads.contains_key(thread_id.as_str()) {
            return Err(AskdeskError::remote(format!("no thread found with id {thread_id}")));
        }
        state.dispatch(thread_id.0.clone(), question, attachment)
    }

    async fn poll_run(
        &self,
        _thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<RunState, AskdeskError> {
        let mut state = self.state.lock().await;
        state.poll_instants.push(Instant::now());
        if state.fail_poll {
            return Err(AskdeskError::remote("scripted poll failure"));
        }

        let run = state
            .runs
            .get_mut(run_id.as_str())
            .ok_or_else(|| AskdeskError::remote(format!("no run found with id {run_id}")))?;
        if let Some(next) = run.remaining.pop_front() {
            run.current = next;
        }
        let current = run.current.clone();
        state.settle(run_id.as_str());
        Ok(current)
    }

    async fn cancel_run(&self, _thread_id: &ThreadId, run_id: &RunId) -> Result<(), AskdeskError> {
        self.state.lock().await.cancelled.push(run_id.clone());
        Ok(())
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>, AskdeskError> {
        let state = self.state.lock().await;
        if state.fail_list {
            return Err(AskdeskError::remote("scripted history failure"));
        }
        let mut messages = state
            .threads
            .get(thread_id.as_str())
            .cloned()
            .ok_or_else(|| AskdeskError::remote(format!("no thread found with id {thread_id}")))?;
        // Newest first, like the remote API's default listing.
        messages.reverse();
        Ok(messages)
    }

    async fn get_file_metadata(&self, file_id: &FileId) -> Result<String, AskdeskError> {
        let state = self.state.lock().await;
        if state.failing_files.contains(file_id.as_str()) {
            return Err(AskdeskError::Lookup {
                file_id: file_id.to_string(),
                message: "scripted lookup failure".into(),
            });
        }
        state
            .filenames
            .get(file_id.as_str())
            .cloned()
            .ok_or_else(|| AskdeskError::Lookup {
                file_id: file_id.to_string(),
                message: "unknown file".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unscripted_run_completes_on_dispatch() {
        let assistant = ScriptedAssistant::new();
        let run = assistant.start_conversation("hi", &[], None).await.unwrap();
        assert_eq!(run.state, RunState::Completed);

        let messages = assistant.thread_messages(run.thread_id.as_str()).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].first_text(), Some("Answer 1"));
    }

    #[tokio::test]
    async fn script_advances_one_state_per_poll() {
        let assistant = ScriptedAssistant::new().with_run_script(vec![
            RunState::Queued,
            RunState::InProgress,
            RunState::Completed,
        ]);
        let run = assistant.start_conversation("hi", &[], None).await.unwrap();
        assert_eq!(run.state, RunState::Queued);

        let poll = || assistant.poll_run(&run.thread_id, &run.run_id);
        assert_eq!(poll().await.unwrap(), RunState::InProgress);
        assert_eq!(assistant.thread_messages(run.thread_id.as_str()).await.len(), 1);
        assert_eq!(poll().await.unwrap(), RunState::Completed);
        assert_eq!(poll().await.unwrap(), RunState::Completed);
        assert_eq!(assistant.thread_messages(run.thread_id.as_str()).await.len(), 2);
        assert_eq!(assistant.poll_count().await, 3);
    }

    #[tokio::test]
    async fn list_messages_is_newest_first() {
        let assistant = ScriptedAssistant::new();
        let run = assistant.start_conversation("q1", &[], None).await.unwrap();
        let messages = assistant.list_messages(&run.thread_id).await.unwrap();
        assert!(messages[0].created_at > messages[1].created_at);
    }

    #[tokio::test]
    async fn continue_unknown_thread_fails() {
        let assistant = ScriptedAssistant::new();
        let err = assistant
            .continue_conversation(&ThreadId("thread_404".into()), "hi", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AskdeskError::RemoteUnavailable { .. }));
    }

    #[tokio::test]
    async fn uploaded_file_resolves_to_its_name() {
        let staged = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(staged.path(), b"data").unwrap();

        let assistant = ScriptedAssistant::new();
        let id = assistant.upload_file(staged.path(), "notes.txt").await.unwrap();
        assert_eq!(assistant.get_file_metadata(&id).await.unwrap(), "notes.txt");
        assert_eq!(assistant.uploads().await[0].bytes, b"data");
    }
}

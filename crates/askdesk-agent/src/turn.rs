// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One question-and-answer turn.
//!
//! Stages run in order: AttachFile -> Dispatch -> Polling -> Extract -> Log
//! -> Render. Once dispatch has been attempted the turn is always logged,
//! whatever happens afterwards.

use std::sync::Arc;

use askdesk_core::traits::{AssistantClient, InteractionLog};
use askdesk_core::types::{Citation, FileId, LogRecord, RunState, ThreadId};
use askdesk_core::AskdeskError;
use strum::Display;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::attachment::{self, Attachment};
use crate::extract::{self, TranscriptEntry, NO_ANSWER};
use crate::poll::{self, PollPolicy};

/// Stages of the per-turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TurnStage {
    AttachFile,
    Dispatch,
    Polling,
    Extract,
    Log,
    Render,
}

/// Input of a turn as submitted by the user.
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    /// Continuation token from the previous page. Blank means a new conversation.
    pub thread_id: Option<String>,
    pub question: String,
    pub attachment: Option<Attachment>,
}

impl TurnRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    pub fn on_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// The thread to continue, if the request names a non-blank one.
    ///
    /// A malformed id is an [`AskdeskError::InvalidInput`].
    pub fn thread(&self) -> Result<Option<ThreadId>, AskdeskError> {
        match self.thread_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => ThreadId::parse(raw).map(Some),
        }
    }
}

/// Everything the presentation layer needs to render a finished turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub thread_id: ThreadId,
    pub question: String,
    /// Latest assistant text, or [`NO_ANSWER`].
    pub answer: String,
    pub citations: Vec<Citation>,
    /// Whole conversation, oldest first.
    pub transcript: Vec<TranscriptEntry>,
    pub run_state: RunState,
}

/// A turn that failed before it could be rendered.
///
/// Carries the thread id when one is known, so a degraded page can still
/// offer to continue the conversation.
#[derive(Debug, Error)]
#[error("turn failed during {stage}: {source}")]
pub struct TurnError {
    pub thread_id: Option<ThreadId>,
    pub stage: TurnStage,
    pub source: AskdeskError,
}

/// Drives turns against the remote assistant and records them.
pub struct TurnOrchestrator {
    client: Arc<dyn AssistantClient>,
    log: Arc<dyn InteractionLog>,
    knowledge_sources: Vec<String>,
    policy: PollPolicy,
    shutdown: CancellationToken,
}

impl TurnOrchestrator {
    pub fn new(
        client: Arc<dyn AssistantClient>,
        log: Arc<dyn InteractionLog>,
        knowledge_sources: Vec<String>,
        policy: PollPolicy,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            log,
            knowledge_sources,
            policy,
            shutdown,
        }
    }

    pub fn log(&self) -> &Arc<dyn InteractionLog> {
        &self.log
    }

    /// Runs one turn end to end.
    ///
    /// Logging failures are reported on the operational log and never change
    /// the result.
    pub async fn run_turn(&self, request: TurnRequest) -> Result<TurnOutcome, TurnError> {
        let thread = request.thread().map_err(|source| TurnError {
            thread_id: None,
            stage: TurnStage::Dispatch,
            source,
        })?;

        let file_id = match request.attachment.as_ref().filter(|a| !a.is_empty()) {
            Some(attachment) => Some(self.attach(attachment).await.map_err(|source| TurnError {
                thread_id: thread.clone(),
                stage: TurnStage::AttachFile,
                source,
            })?),
            None => None,
        };

        let result = self
            .converse(thread.as_ref(), &request.question, file_id.as_ref())
            .await;

        debug!(stage = %TurnStage::Log, "recording turn");
        let record = match &result {
            Ok(outcome) => LogRecord::now(
                outcome.thread_id.as_str(),
                request.question.as_str(),
                outcome.answer.as_str(),
            ),
            Err(e) => LogRecord::now(
                e.thread_id.as_ref().map(ThreadId::as_str).unwrap_or_default(),
                request.question.as_str(),
                NO_ANSWER,
            ),
        };
        if let Err(e) = self.log.append(&record).await {
            error!(error = %e, thread_id = record.thread_id, "failed to record interaction");
        }

        if let Ok(outcome) = &result {
            debug!(stage = %TurnStage::Render, thread_id = %outcome.thread_id, "turn complete");
        }
        result
    }

    async fn attach(&self, attachment: &Attachment) -> Result<FileId, AskdeskError> {
        debug!(stage = %TurnStage::AttachFile, filename = attachment.filename, size = attachment.bytes.len(), "staging attachment");
        let staged = attachment::stage(attachment).await?;
        let file_id = self
            .client
            .upload_file(staged.path(), &attachment.filename)
            .await?;
        drop(staged);
        info!(file_id = %file_id, filename = attachment.filename, "attachment uploaded");
        Ok(file_id)
    }

    /// Dispatch, Polling, and Extract.
    async fn converse(
        &self,
        thread: Option<&ThreadId>,
        question: &str,
        file_id: Option<&FileId>,
    ) -> Result<TurnOutcome, TurnError> {
        debug!(stage = %TurnStage::Dispatch, new_thread = thread.is_none(), "dispatching question");
        let dispatched = match thread {
            None => {
                self.client
                    .start_conversation(question, &self.knowledge_sources, file_id)
                    .await
            }
            Some(thread_id) => {
                self.client
                    .continue_conversation(thread_id, question, file_id)
                    .await
            }
        }
        .map_err(|source| TurnError {
            thread_id: thread.cloned(),
            stage: TurnStage::Dispatch,
            source,
        })?;

        let thread_id = dispatched.thread_id.clone();
        let fail = |stage: TurnStage| {
            let thread_id = thread_id.clone();
            move |source: AskdeskError| TurnError {
                thread_id: Some(thread_id),
                stage,
                source,
            }
        };

        debug!(stage = %TurnStage::Polling, thread_id = %thread_id, run_id = %dispatched.run_id, "waiting for run");
        let state =
            poll::wait_for_terminal(self.client.as_ref(), &dispatched, &self.policy, &self.shutdown)
                .await
                .map_err(fail(TurnStage::Polling))?;

        debug!(stage = %TurnStage::Extract, thread_id = %thread_id, state = %state, "extracting answer");
        let mut messages = self
            .client
            .list_messages(&thread_id)
            .await
            .map_err(fail(TurnStage::Extract))?;
        extract::sort_chronologically(&mut messages);

        let (answer, citations) = match extract::latest_answer(&messages) {
            Some(message) if state == RunState::Completed => (
                message.first_text().unwrap_or(NO_ANSWER).to_string(),
                extract::collect_citations(self.client.as_ref(), message).await,
            ),
            _ => (NO_ANSWER.to_string(), Vec::new()),
        };

        Ok(TurnOutcome {
            thread_id,
            question: question.to_string(),
            answer,
            citations,
            transcript: extract::transcript(&messages),
            run_state: state,
        })
    }
}

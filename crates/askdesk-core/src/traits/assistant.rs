// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote assistant client trait.

use std::path::Path;

use async_trait::async_trait;

use crate::error::AskdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{DispatchedRun, FileId, Message, RunId, RunState, ThreadId};

/// Capability set of the remote conversational-assistant service.
///
/// Every operation may fail with [`AskdeskError::RemoteUnavailable`]. Retry
/// cadence for [`poll_run`](AssistantClient::poll_run) is the caller's concern.
#[async_trait]
pub trait AssistantClient: PluginAdapter {
    /// Uploads a staged file so the assistant can reference it.
    ///
    /// Fails with [`AskdeskError::Upload`].
    async fn upload_file(&self, path: &Path, filename: &str) -> Result<FileId, AskdeskError>;

    /// Creates a new thread seeded with `question` and starts a run on it.
    async fn start_conversation(
        &self,
        question: &str,
        knowledge_sources: &[String],
        attachment: Option<&FileId>,
    ) -> Result<DispatchedRun, AskdeskError>;

    /// Appends `question` to an existing thread and starts a run on it.
    async fn continue_conversation(
        &self,
        thread_id: &ThreadId,
        question: &str,
        attachment: Option<&FileId>,
    ) -> Result<DispatchedRun, AskdeskError>;

    /// Fetches the current state of a run.
    async fn poll_run(&self, thread_id: &ThreadId, run_id: &RunId)
    -> Result<RunState, AskdeskError>;

    /// Asks the service to stop a run. Best-effort.
    async fn cancel_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<(), AskdeskError>;

    /// Lists the messages of a thread in server arrival order.
    ///
    /// The order is NOT guaranteed to be chronological.
    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>, AskdeskError>;

    /// Resolves a file id to its filename.
    ///
    /// Fails with [`AskdeskError::Lookup`] when the file is unknown or inaccessible.
    async fn get_file_metadata(&self, file_id: &FileId) -> Result<String, AskdeskError>;
}

// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI Assistants adapter for askdesk.
//!
//! This crate implements [`AssistantClient`] on top of the Assistants API:
//! threads hold conversations, runs produce answers, and file search over
//! the configured vector stores supplies citations.

pub mod client;
pub mod types;

use std::path::Path;
use std::time::Duration;

use askdesk_config::AskdeskConfig;
use askdesk_core::error::AskdeskError;
use askdesk_core::traits::{AssistantClient, PluginAdapter};
use askdesk_core::types::{
    AdapterType, DispatchedRun, FileId, HealthStatus, Message, RunId, RunState, ThreadId,
};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{
    CreateRunRequest, CreateThreadAndRunRequest, FileSearchResources, NewMessage, RunObject,
    ThreadSeed, ToolResources,
};

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Remote assistant backed by the OpenAI Assistants API.
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
pub struct OpenAiAssistant {
    client: OpenAiClient,
    assistant_id: String,
}

impl OpenAiAssistant {
    /// Creates the adapter from the loaded configuration.
    ///
    /// Fails with [`AskdeskError::Config`] when no API key can be found.
    pub fn new(config: &AskdeskConfig) -> Result<Self, AskdeskError> {
        let api_key = resolve_api_key(&config.assistant.api_key, std::env::var(API_KEY_ENV).ok())?;
        let client = OpenAiClient::new(
            &api_key,
            &config.assistant.base_url,
            Duration::from_secs(config.assistant.request_timeout_secs),
        )?;

        info!(
            assistant_id = %config.assistant.assistant_id,
            base_url = client.base_url(),
            "OpenAI assistant initialized"
        );

        Ok(Self::with_client(
            client,
            config.assistant.assistant_id.clone(),
        ))
    }

    /// Creates the adapter around an existing client.
    pub fn with_client(client: OpenAiClient, assistant_id: String) -> Self {
        Self {
            client,
            assistant_id,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiAssistant {
    fn name(&self) -> &str {
        "openai-assistant"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Assistant
    }

    async fn health_check(&self) -> Result<HealthStatus, AskdeskError> {
        // Avoid spending API quota on health probes.
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl AssistantClient for OpenAiAssistant {
    async fn upload_file(&self, path: &Path, filename: &str) -> Result<FileId, AskdeskError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AskdeskError::Upload {
                message: format!("failed to read staged file {}: {e}", path.display()),
                source: Some(Box::new(e)),
            })?;
        let size = bytes.len();

        let file = self
            .client
            .upload_file(filename, bytes)
            .await
            .map_err(|e| AskdeskError::Upload {
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;

        debug!(file_id = file.id, filename, size, "attachment uploaded");
        Ok(FileId(file.id))
    }

    async fn start_conversation(
        &self,
        question: &str,
        knowledge_sources: &[String],
        attachment: Option<&FileId>,
    ) -> Result<DispatchedRun, AskdeskError> {
        let tool_resources = (!knowledge_sources.is_empty()).then(|| ToolResources {
            file_search: FileSearchResources {
                vector_store_ids: knowledge_sources.to_vec(),
            },
        });
        let request = CreateThreadAndRunRequest {
            assistant_id: self.assistant_id.clone(),
            thread: ThreadSeed {
                messages: vec![NewMessage::user(question, attachment)],
            },
            tool_resources,
        };

        let run = self.client.create_thread_and_run(&request).await?;
        debug!(thread_id = run.thread_id, run_id = run.id, status = run.status, "conversation started");
        Ok(dispatched(run))
    }

    async fn continue_conversation(
        &self,
        thread_id: &ThreadId,
        question: &str,
        attachment: Option<&FileId>,
    ) -> Result<DispatchedRun, AskdeskError> {
        self.client
            .create_message(thread_id.as_str(), &NewMessage::user(question, attachment))
            .await?;

        let run = self
            .client
            .create_run(
                thread_id.as_str(),
                &CreateRunRequest {
                    assistant_id: self.assistant_id.clone(),
                },
            )
            .await?;
        debug!(thread_id = run.thread_id, run_id = run.id, status = run.status, "conversation continued");
        Ok(dispatched(run))
    }

    async fn poll_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<RunState, AskdeskError> {
        let run = self
            .client
            .retrieve_run(thread_id.as_str(), run_id.as_str())
            .await?;
        Ok(RunState::from_status(&run.status))
    }

    async fn cancel_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<(), AskdeskError> {
        self.client
            .cancel_run(thread_id.as_str(), run_id.as_str())
            .await?;
        Ok(())
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>, AskdeskError> {
        let mut messages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .client
                .list_messages_page(thread_id.as_str(), cursor.as_deref())
                .await?;
            let next = page.last_id.clone();
            messages.extend(page.data.into_iter().map(Message::from));

            match next {
                Some(last) if page.has_more => cursor = Some(last),
                _ => break,
            }
        }

        Ok(messages)
    }

    async fn get_file_metadata(&self, file_id: &FileId) -> Result<String, AskdeskError> {
        let file = self
            .client
            .retrieve_file(file_id.as_str())
            .await
            .map_err(|e| AskdeskError::Lookup {
                file_id: file_id.to_string(),
                message: e.to_string(),
            })?;
        Ok(file.filename)
    }
}

fn dispatched(run: RunObject) -> DispatchedRun {
    DispatchedRun {
        thread_id: ThreadId(run.thread_id),
        run_id: RunId(run.id),
        state: RunState::from_status(&run.status),
    }
}

/// Resolves the API key from config, then the environment value.
fn resolve_api_key(
    config_key: &Option<String>,
    env_key: Option<String>,
) -> Result<String, AskdeskError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    env_key.filter(|key| !key.is_empty()).ok_or_else(|| {
        AskdeskError::Config(format!(
            "OpenAI API key not found. Set assistant.api_key in config or {API_KEY_ENV} environment variable."
        ))
    })
}

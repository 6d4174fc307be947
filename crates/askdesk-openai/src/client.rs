// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI Assistants API.
//!
//! Provides [`OpenAiClient`] which handles authentication, JSON and multipart
//! request construction, and transient error retry.

use std::time::Duration;

use askdesk_core::AskdeskError;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{
    ApiErrorResponse, CreateRunRequest, CreateThreadAndRunRequest, FileObject, MessageList,
    MessageObject, NewMessage, RunObject,
};

/// Page size used when listing thread messages.
const MESSAGE_PAGE_LIMIT: u32 = 100;

/// Which failures a request may be retried on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Retry {
    /// Reads: retried on 429 and on 500/502/503.
    Idempotent,
    /// Writes: a 5xx may arrive after the write was committed, so only a 429
    /// (rejected before processing) is retried.
    RateLimitOnly,
}

impl Retry {
    fn allows(self, status: reqwest::StatusCode) -> bool {
        match self {
            Retry::Idempotent => is_transient_error(status),
            Retry::RateLimitOnly => status == reqwest::StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

/// HTTP client for the Assistants API.
///
/// Reads are retried once after a 1-second delay on 429, 500, 502 and 503.
/// Writes are retried only on 429.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: Url,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenAiClient {
    /// Creates a client bound to `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, AskdeskError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| AskdeskError::Config(format!("invalid assistant base URL {base_url:?}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                AskdeskError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("OpenAI-Beta", HeaderValue::from_static("assistants=v2"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| AskdeskError::RemoteUnavailable {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url,
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Base URL with `segments` appended, each percent-encoded.
    ///
    /// Ids are never spliced into the path as text, so a `/`, `?` or `..`
    /// inside one cannot address another endpoint. Empty and dot segments
    /// are refused outright.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AskdeskError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(AskdeskError::InvalidInput(format!(
                "refusing path segment {bad:?}"
            )));
        }
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// `POST /threads/runs`
    pub async fn create_thread_and_run(
        &self,
        request: &CreateThreadAndRunRequest,
    ) -> Result<RunObject, AskdeskError> {
        let url = self.endpoint(&["threads", "runs"])?;
        self.execute("create thread and run", Retry::RateLimitOnly, |c| {
            c.post(url.clone()).json(request)
        })
        .await
    }

    /// `POST /threads/{thread_id}/messages`
    pub async fn create_message(
        &self,
        thread_id: &str,
        message: &NewMessage,
    ) -> Result<MessageObject, AskdeskError> {
        let url = self.endpoint(&["threads", thread_id, "messages"])?;
        self.execute("create message", Retry::RateLimitOnly, |c| {
            c.post(url.clone()).json(message)
        })
        .await
    }

    /// `POST /threads/{thread_id}/runs`
    pub async fn create_run(
        &self,
        thread_id: &str,
        request: &CreateRunRequest,
    ) -> Result<RunObject, AskdeskError> {
        let url = self.endpoint(&["threads", thread_id, "runs"])?;
        self.execute("create run", Retry::RateLimitOnly, |c| {
            c.post(url.clone()).json(request)
        })
        .await
    }

    /// `GET /threads/{thread_id}/runs/{run_id}`
    pub async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<RunObject, AskdeskError> {
        let url = self.endpoint(&["threads", thread_id, "runs", run_id])?;
        self.execute("retrieve run", Retry::Idempotent, |c| c.get(url.clone()))
            .await
    }

    /// `POST /threads/{thread_id}/runs/{run_id}/cancel`
    pub async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<RunObject, AskdeskError> {
        let url = self.endpoint(&["threads", thread_id, "runs", run_id, "cancel"])?;
        self.execute("cancel run", Retry::RateLimitOnly, |c| c.post(url.clone()))
            .await
    }

    /// `GET /threads/{thread_id}/messages`, one page.
    pub async fn list_messages_page(
        &self,
        thread_id: &str,
        after: Option<&str>,
    ) -> Result<MessageList, AskdeskError> {
        let mut url = self.endpoint(&["threads", thread_id, "messages"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &MESSAGE_PAGE_LIMIT.to_string());
            if let Some(cursor) = after {
                query.append_pair("after", cursor);
            }
        }
        self.execute("list messages", Retry::Idempotent, |c| c.get(url.clone()))
            .await
    }

    /// `POST /files` with purpose `assistants`.
    pub async fn upload_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<FileObject, AskdeskError> {
        let url = self.endpoint(&["files"])?;
        self.execute("upload file", Retry::RateLimitOnly, |c| {
            let part = Part::bytes(bytes.clone()).file_name(filename.to_string());
            let form = Form::new().text("purpose", "assistants").part("file", part);
            c.post(url.clone()).multipart(form)
        })
        .await
    }

    /// `GET /files/{file_id}`
    pub async fn retrieve_file(&self, file_id: &str) -> Result<FileObject, AskdeskError> {
        let url = self.endpoint(&["files", file_id])?;
        self.execute("retrieve file", Retry::Idempotent, |c| c.get(url.clone()))
            .await
    }

    /// Sends the request built by `build`, retrying once when `retry` allows.
    ///
    /// `build` is invoked once per attempt so request bodies are rebuilt fresh.
    async fn execute<T, F>(&self, operation: &str, retry: Retry, build: F) -> Result<T, AskdeskError>
    where
        T: DeserializeOwned,
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, operation, "retrying request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = build(&self.client)
                .send()
                .await
                .map_err(|e| AskdeskError::RemoteUnavailable {
                    message: format!("{operation}: HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, operation, "assistant API response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| AskdeskError::RemoteUnavailable {
                    message: format!("{operation}: failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&body).map_err(|e| AskdeskError::RemoteUnavailable {
                    message: format!("{operation}: failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let body = response.text().await.unwrap_or_default();

            if retry.allows(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(AskdeskError::remote(format!(
                    "{operation}: API returned {status}: {body}"
                )));
                continue;
            }

            return Err(AskdeskError::remote(describe_api_error(operation, status, &body)));
        }

        Err(last_error.unwrap_or_else(|| {
            AskdeskError::remote(format!("{operation}: request failed after retries"))
        }))
    }
}

/// Formats an error response, preferring the structured API error when present.
fn describe_api_error(operation: &str, status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!(
            "{operation}: OpenAI API error ({}, {status}): {}",
            api_err.error.type_.as_deref().unwrap_or("unknown"),
            api_err.error.message
        ),
        Err(_) => format!("{operation}: API returned {status}: {body}"),
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}

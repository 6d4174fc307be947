// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the OpenAI Assistants API (threads, runs, messages, files).

use askdesk_core::types::{Annotation, ContentSegment, FileId, Message, Role};
use serde::{Deserialize, Serialize};

// --- Requests ---

/// Body of `POST /threads/runs` (create a thread and run it in one call).
#[derive(Debug, Clone, Serialize)]
pub struct CreateThreadAndRunRequest {
    pub assistant_id: String,
    pub thread: ThreadSeed,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<ToolResources>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadSeed {
    pub messages: Vec<NewMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolResources {
    pub file_search: FileSearchResources,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSearchResources {
    pub vector_store_ids: Vec<String>,
}

/// Body of `POST /threads/{id}/messages`, also used to seed a new thread.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<MessageAttachment>,
}

impl NewMessage {
    pub fn user(content: &str, attachment: Option<&FileId>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
            attachments: attachment
                .map(|file_id| MessageAttachment {
                    file_id: file_id.0.clone(),
                    tools: vec![AttachmentTool::file_search()],
                })
                .into_iter()
                .collect(),
        }
    }
}

/// A file attached to a message, searchable by the listed tools.
#[derive(Debug, Clone, Serialize)]
pub struct MessageAttachment {
    pub file_id: String,
    pub tools: Vec<AttachmentTool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentTool {
    #[serde(rename = "type")]
    pub type_: String,
}

impl AttachmentTool {
    pub fn file_search() -> Self {
        Self {
            type_: "file_search".to_string(),
        }
    }
}

/// Body of `POST /threads/{id}/runs`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest {
    pub assistant_id: String,
}

// --- Responses ---

#[derive(Debug, Clone, Deserialize)]
pub struct RunObject {
    pub id: String,
    pub thread_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageObject {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageList {
    pub data: Vec<ApiMessage>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub last_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    pub id: String,
    pub role: String,
    pub created_at: i64,
    #[serde(default)]
    pub content: Vec<ApiContent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiContent {
    Text { text: ApiText },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiText {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<ApiAnnotation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiAnnotation {
    FileCitation { file_citation: FileCitationRef },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileCitationRef {
    pub file_id: String,
    #[serde(default)]
    pub quote: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub id: String,
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
}

impl From<ApiMessage> for Message {
    fn from(msg: ApiMessage) -> Self {
        let role = if msg.role == "assistant" {
            Role::Assistant
        } else {
            Role::User
        };
        let content = msg
            .content
            .into_iter()
            .map(|part| match part {
                ApiContent::Text { text } => ContentSegment::Text {
                    value: text.value,
                    annotations: text
                        .annotations
                        .into_iter()
                        .map(|annotation| match annotation {
                            ApiAnnotation::FileCitation { file_citation } => {
                                Annotation::FileCitation {
                                    file_id: FileId(file_citation.file_id),
                                    quote: file_citation.quote.filter(|q| !q.is_empty()),
                                }
                            }
                            ApiAnnotation::Other => Annotation::Other,
                        })
                        .collect(),
                },
                ApiContent::Other => ContentSegment::Other,
            })
            .collect();

        Message {
            id: msg.id,
            role,
            created_at: msg.created_at,
            content,
        }
    }
}

// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Handles GET /, POST /ask, POST /escalate, GET /stats, GET /health.

use axum::{
    Form, Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use askdesk_agent::{Attachment, TurnRequest};
use askdesk_core::types::ThreadId;

use crate::error::{describe, status_for};
use crate::render;
use crate::server::GatewayState;

/// Form body for POST /escalate.
#[derive(Debug, Deserialize)]
pub struct EscalateForm {
    #[serde(default)]
    pub thread_id: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /
pub async fn get_index() -> Html<String> {
    Html(render::index_page())
}

/// POST /ask
///
/// Accepts `question` (required), `thread_id` and `file` (optional) as
/// multipart fields and runs one turn.
pub async fn post_ask(State(state): State<GatewayState>, multipart: Multipart) -> Response {
    let request = match read_ask_form(multipart).await {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "malformed ask form");
            return (
                e.status(),
                Html(render::degraded_page("Invalid request", &e.body_text(), None)),
            )
                .into_response();
        }
    };

    if request.question.trim().is_empty() {
        let thread = request.thread().ok().flatten();
        return (
            StatusCode::BAD_REQUEST,
            Html(render::degraded_page(
                "Question missing",
                "Please enter a question.",
                thread.as_ref(),
            )),
        )
            .into_response();
    }

    match state.orchestrator.run_turn(request).await {
        Ok(outcome) => Html(render::answer_page(&outcome)).into_response(),
        Err(e) => {
            warn!(stage = %e.stage, error = %e.source, "turn failed");
            let (title, message) = describe(&e.source);
            (
                status_for(&e.source),
                Html(render::degraded_page(title, &message, e.thread_id.as_ref())),
            )
                .into_response()
        }
    }
}

async fn read_ask_form(mut multipart: Multipart) -> Result<TurnRequest, MultipartError> {
    let mut request = TurnRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "question" => request.question = field.text().await?,
            "thread_id" => request.thread_id = Some(field.text().await?),
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                request.attachment = Some(Attachment::new(filename, bytes.to_vec()));
            }
            _ => {}
        }
    }

    Ok(request)
}

/// POST /escalate
pub async fn post_escalate(
    State(state): State<GatewayState>,
    Form(form): Form<EscalateForm>,
) -> Response {
    if form.thread_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Html(render::degraded_page(
                "Nothing to escalate",
                "No conversation was given. Ask a question first.",
                None,
            )),
        )
            .into_response();
    }

    let thread_id = match ThreadId::parse(&form.thread_id) {
        Ok(thread_id) => thread_id,
        Err(e) => {
            warn!(error = %e, "rejected escalation");
            let (title, message) = describe(&e);
            return (status_for(&e), Html(render::degraded_page(title, &message, None)))
                .into_response();
        }
    };

    match state.escalation.escalate(&thread_id).await {
        Ok(outcome) => {
            info!(thread_id = %thread_id, delivered = outcome.delivered, "escalation handled");
            Html(render::escalation_page(&outcome)).into_response()
        }
        Err(e) => {
            warn!(thread_id = %thread_id, error = %e, "escalation failed");
            let (title, message) = describe(&e);
            (
                status_for(&e),
                Html(render::degraded_page(title, &message, Some(&thread_id))),
            )
                .into_response()
        }
    }
}

/// GET /stats
///
/// Always answers 200; read failures are shown on the page.
pub async fn get_stats(State(state): State<GatewayState>) -> Html<String> {
    match state.ledger.stats(state.recent_rows).await {
        Ok(report) => Html(render::stats_page(&report)),
        Err(e) => {
            warn!(error = %e, "failed to read interaction log");
            Html(render::stats_error_page(&e.to_string()))
        }
    }
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

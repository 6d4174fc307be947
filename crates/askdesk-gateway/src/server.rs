// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use askdesk_agent::{EscalationHandler, TurnOrchestrator};
use askdesk_config::model::ServerConfig;
use askdesk_core::traits::InteractionLog;
use askdesk_core::AskdeskError;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Runs question turns.
    pub orchestrator: Arc<TurnOrchestrator>,
    /// Hands conversations off to a human.
    pub escalation: Arc<EscalationHandler>,
    /// Read side of the interaction log, for the stats page.
    pub ledger: Arc<dyn InteractionLog>,
    /// Number of rows shown on the stats page.
    pub recent_rows: usize,
}

/// Builds the application router.
///
/// Request bodies above `max_body_bytes` are rejected with 413.
pub fn build_router(state: GatewayState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::get_index))
        .route("/ask", post(handlers::post_ask))
        .route("/escalate", post(handlers::post_escalate))
        .route("/stats", get(handlers::get_stats))
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Starts the gateway HTTP server.
///
/// Binds to the configured host:port and serves until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), AskdeskError> {
    let app = build_router(state, config.max_upload_bytes);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AskdeskError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AskdeskError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}

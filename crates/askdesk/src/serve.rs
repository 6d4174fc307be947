// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `askdesk serve` and `askdesk check-config`.
//!
//! Wires the OpenAI assistant client, the CSV interaction log and the turn
//! and escalation services into the gateway, then serves until a shutdown
//! signal arrives.

use std::sync::Arc;

use askdesk_agent::{EscalationHandler, PollPolicy, TracingDelivery, TurnOrchestrator, shutdown};
use askdesk_config::model::AskdeskConfig;
use askdesk_core::AskdeskError;
use askdesk_core::traits::{AssistantClient, InteractionLog, PluginAdapter};
use askdesk_gateway::{GatewayState, start_server};
use askdesk_ledger::CsvLedger;
use askdesk_openai::OpenAiAssistant;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Runs the server until SIGINT or SIGTERM.
pub async fn run_serve(config: AskdeskConfig) -> Result<(), AskdeskError> {
    init_tracing(&config.logging.level);

    info!("starting askdesk serve");

    let shutdown = shutdown::install_signal_handler();
    let state = build_state(&config, shutdown.clone())?;

    start_server(&config.server, state, shutdown).await?;

    info!("askdesk stopped");
    Ok(())
}

/// Builds the gateway state from configuration.
///
/// Fails when no API key can be resolved.
pub fn build_state(
    config: &AskdeskConfig,
    shutdown: CancellationToken,
) -> Result<GatewayState, AskdeskError> {
    let assistant = OpenAiAssistant::new(config)?;
    info!(
        adapter = assistant.name(),
        assistant_id = %config.assistant.assistant_id,
        "assistant client ready"
    );
    let client: Arc<dyn AssistantClient> = Arc::new(assistant);

    let ledger: Arc<dyn InteractionLog> = Arc::new(CsvLedger::new(&config.ledger.path));
    info!(path = %config.ledger.path, "interaction log ready");

    let policy = PollPolicy::from(&config.poll);

    let orchestrator = TurnOrchestrator::new(
        client.clone(),
        ledger.clone(),
        config.assistant.vector_store_ids.clone(),
        policy,
        shutdown.clone(),
    );
    let escalation = EscalationHandler::new(
        client,
        Arc::new(TracingDelivery),
        policy,
        shutdown,
    );

    Ok(GatewayState {
        orchestrator: Arc::new(orchestrator),
        escalation: Arc::new(escalation),
        ledger,
        recent_rows: config.ledger.recent_rows,
    })
}

/// Renders the effective configuration as TOML with the API key removed.
pub fn effective_settings(config: &AskdeskConfig) -> Result<String, AskdeskError> {
    let key_present = config.assistant.api_key.is_some();
    let mut redacted = config.clone();
    redacted.assistant.api_key = None;

    let body = toml::to_string_pretty(&redacted)
        .map_err(|e| AskdeskError::Config(format!("failed to render configuration: {e}")))?;
    let key_note = if key_present {
        "# assistant.api_key is set in configuration (hidden)\n"
    } else {
        "# assistant.api_key not set; OPENAI_API_KEY is used\n"
    };
    Ok(format!("{key_note}{body}"))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("askdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

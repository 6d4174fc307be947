// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, cancellable polling of remote runs.
//!
//! The loop is `poll -> terminal? -> sleep(interval)`. It ends on the first
//! terminal state, after `max_attempts` polls, after `max_wait` elapsed, or
//! when the shutdown token fires. The last three abandon the run with a
//! best-effort cancel.

use std::time::Duration;

use askdesk_config::model::PollConfig;
use askdesk_core::traits::AssistantClient;
use askdesk_core::types::{DispatchedRun, RunState};
use askdesk_core::AskdeskError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Cadence and bounds of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_wait: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollConfig::default())
    }
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        Self {
            interval: config.interval(),
            max_wait: config.max_wait(),
            max_attempts: config.max_attempts,
        }
    }
}

/// Waits until `run` reaches a terminal state.
///
/// Returns immediately when the dispatch already reported a terminal state.
/// Fails with [`AskdeskError::Timeout`] when the bounds are exhausted and with
/// [`AskdeskError::RemoteUnavailable`] on a poll failure or shutdown.
pub async fn wait_for_terminal(
    client: &dyn AssistantClient,
    run: &DispatchedRun,
    policy: &PollPolicy,
    shutdown: &CancellationToken,
) -> Result<RunState, AskdeskError> {
    if run.state.is_terminal() {
        return Ok(run.state.clone());
    }

    let started = Instant::now();
    let waited = tokio::select! {
        _ = shutdown.cancelled() => None,
        waited = tokio::time::timeout(policy.max_wait, poll_loop(client, run, policy)) => Some(waited),
    };

    let error = match waited {
        Some(Ok(Ok(Some(state)))) => return Ok(state),
        Some(Ok(Err(e))) => return Err(e),
        Some(Ok(Ok(None))) => {
            warn!(
                run_id = %run.run_id,
                attempts = policy.max_attempts,
                "run still pending after maximum poll attempts"
            );
            AskdeskError::Timeout {
                duration: started.elapsed(),
            }
        }
        Some(Err(_)) => {
            warn!(run_id = %run.run_id, max_wait = ?policy.max_wait, "run still pending after maximum wait");
            AskdeskError::Timeout {
                duration: policy.max_wait,
            }
        }
        None => {
            info!(run_id = %run.run_id, "shutdown requested, abandoning run");
            AskdeskError::remote("shutting down")
        }
    };

    abandon(client, run).await;
    Err(error)
}

/// Polls until terminal; `None` when the attempt budget runs out first.
async fn poll_loop(
    client: &dyn AssistantClient,
    run: &DispatchedRun,
    policy: &PollPolicy,
) -> Result<Option<RunState>, AskdeskError> {
    for attempt in 1..=policy.max_attempts {
        let state = client.poll_run(&run.thread_id, &run.run_id).await?;
        debug!(
            thread_id = %run.thread_id,
            run_id = %run.run_id,
            attempt,
            state = %state,
            "run polled"
        );
        if state.is_terminal() {
            return Ok(Some(state));
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    Ok(None)
}

async fn abandon(client: &dyn AssistantClient, run: &DispatchedRun) {
    if let Err(e) = client.cancel_run(&run.thread_id, &run.run_id).await {
        warn!(run_id = %run.run_id, error = %e, "failed to cancel abandoned run");
    }
}

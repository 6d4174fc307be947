// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! SIGTERM and SIGINT (Ctrl+C) cancel a [`CancellationToken`] shared by the
//! HTTP server and every poll loop, so in-flight runs are abandoned promptly.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Installs handlers for SIGTERM and SIGINT.
///
/// The returned token is cancelled on whichever signal arrives first.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();

    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        info!(signal, "stopping gateway and abandoning in-flight polls");
        on_signal.cancel();
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => tokio::select! {
            _ = tokio::signal::ctrl_c() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        },
        Err(e) => {
            warn!(error = %e, "SIGTERM handler unavailable; only Ctrl+C stops the server");
            let _ = tokio::signal::ctrl_c().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "Ctrl+C"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_starts_live_and_cancels_children() {
        let token = install_signal_handler();
        let poll_scope = token.child_token();
        assert!(!token.is_cancelled());

        token.cancel();
        assert!(poll_scope.is_cancelled());
    }
}

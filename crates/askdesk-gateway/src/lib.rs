// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP front end for askdesk.
//!
//! Serves server-rendered HTML pages over axum:
//! - `GET /` question form
//! - `POST /ask` one conversation turn (multipart, optional attachment)
//! - `POST /escalate` hand-off summary for a thread
//! - `GET /stats` usage overview from the interaction log
//! - `GET /health` liveness probe (JSON)

pub mod error;
pub mod handlers;
pub mod render;
pub mod server;

pub use server::{GatewayState, build_router, start_server};

// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod assistant;
pub mod delivery;
pub mod ledger;

pub use adapter::PluginAdapter;
pub use assistant::AssistantClient;
pub use delivery::EscalationDelivery;
pub use ledger::InteractionLog;

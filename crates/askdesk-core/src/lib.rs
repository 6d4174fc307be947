// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for askdesk.
//!
//! Provides the adapter traits (assistant client, interaction log, escalation
//! delivery), the error taxonomy, and the conversation types shared by every
//! crate in the workspace.

pub mod error;
pub mod traits;
pub mod types;

pub use error::AskdeskError;
pub use types::{
    AdapterType, Annotation, Citation, ContentSegment, DispatchedRun, EscalationRecord, FileId,
    HealthStatus, LogRecord, Message, Role, RunId, RunState, StatsReport, ThreadId,
};

pub use traits::{AssistantClient, EscalationDelivery, InteractionLog, PluginAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn askdesk_error_has_all_variants() {
        let _config = AskdeskError::Config("test".into());
        let _remote = AskdeskError::remote("down");
        let _lookup = AskdeskError::Lookup {
            file_id: "file-1".into(),
            message: "not found".into(),
        };
        let _upload = AskdeskError::Upload {
            message: "test".into(),
            source: None,
        };
        let _logging = AskdeskError::logging(std::io::Error::other("disk full"));
        let _timeout = AskdeskError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _invalid = AskdeskError::InvalidInput("test".into());
        let _internal = AskdeskError::Internal("test".into());
    }

    #[test]
    fn error_messages_name_the_failure() {
        let err = AskdeskError::Lookup {
            file_id: "file-9".into(),
            message: "404".into(),
        };
        assert_eq!(err.to_string(), "file lookup failed for file-9: 404");

        let err = AskdeskError::logging(std::io::Error::other("read-only"));
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Assistant,
            AdapterType::Ledger,
            AdapterType::Delivery,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_assistant_client<T: AssistantClient>() {}
        fn _assert_interaction_log<T: InteractionLog>() {}
        fn _assert_escalation_delivery<T: EscalationDelivery>() {}
    }
}

// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Twin routing backend.
//!
//! Provides the error type, the common request/response types and the
//! adapter traits that completion backends implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TwinError;
pub use traits::{CompletionBackend, PluginAdapter};
pub use types::{
    AdapterType, ChatMessage, CompletionRequest, CompletionResponse, HealthStatus, SessionId,
    TokenUsage,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twin_error_has_all_variants() {
        let _config = TwinError::Config("test".into());
        let _provider = TwinError::Provider {
            message: "test".into(),
            source: None,
        };
        let _policy = TwinError::ContentPolicy {
            message: "test".into(),
        };
        let _handler = TwinError::Handler {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _timeout = TwinError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _cancelled = TwinError::Cancelled;
        let _internal = TwinError::Internal("test".into());
    }

    #[test]
    fn content_policy_is_detected_by_variant() {
        let blocked = TwinError::ContentPolicy {
            message: "filtered".into(),
        };
        let provider = TwinError::Provider {
            message: "content_filter mentioned in text only".into(),
            source: None,
        };
        assert!(blocked.is_content_policy());
        assert!(!provider.is_content_policy());
    }

    #[test]
    fn adapter_type_display_round_trip() {
        use std::str::FromStr;

        for variant in [AdapterType::Backend, AdapterType::Handler] {
            let s = variant.to_string();
            assert_eq!(AdapterType::from_str(&s).expect("should parse back"), variant);
        }
    }

    #[test]
    fn adapter_type_serialization() {
        let json = serde_json::to_string(&AdapterType::Backend).expect("should serialize");
        let parsed: AdapterType = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(parsed, AdapterType::Backend);
    }

    #[test]
    fn session_id_conversions() {
        let sid = SessionId::from("twin-42");
        assert_eq!(sid.as_str(), "twin-42");
        assert_eq!(sid.to_string(), "twin-42");
        assert_eq!(sid, SessionId("twin-42".to_string()));
    }

    #[test]
    fn chat_message_helpers_set_roles() {
        assert_eq!(ChatMessage::user("hi").role, "user");
        assert_eq!(ChatMessage::assistant("hello").role, "assistant");
    }

    #[test]
    fn backend_trait_is_object_safe() {
        fn _assert_backend(_: &dyn CompletionBackend) {}
        fn _assert_plugin<T: PluginAdapter>() {}
    }
}

// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: confidence ranges,
//! positive timeouts, URL schemes and non-empty user-facing messages.

use crate::diagnostic::ConfigError;
use crate::model::TwinConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &TwinConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let base_url = config.openai.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        fail(format!(
            "openai.base_url `{base_url}` must start with http:// or https://"
        ));
    }

    if config.openai.model.trim().is_empty() {
        fail("openai.model must not be empty".to_string());
    }

    if config.openai.timeout_secs == 0 {
        fail("openai.timeout_secs must be greater than 0".to_string());
    }

    let temperature = config.classifier.temperature;
    if !(0.0..=2.0).contains(&temperature) {
        fail(format!(
            "classifier.temperature must be within 0.0..=2.0, got {temperature}"
        ));
    }

    if config.classifier.max_tokens == 0 {
        fail("classifier.max_tokens must be greater than 0".to_string());
    }

    if config.classifier.reason_max_words == 0 {
        fail("classifier.reason_max_words must be greater than 0".to_string());
    }

    let fallback = &config.fallback;
    for (key, value) in [
        ("generic_confidence", fallback.generic_confidence),
        ("keyword_confidence", fallback.keyword_confidence),
        ("invoice_confidence", fallback.invoice_confidence),
        ("document_confidence", fallback.document_confidence),
        ("profile_confidence", fallback.profile_confidence),
        ("contact_confidence", fallback.contact_confidence),
        ("photo_confidence", fallback.photo_confidence),
    ] {
        if !(0.0..=1.0).contains(&value) {
            fail(format!("fallback.{key} must be within 0.0..=1.0, got {value}"));
        }
    }

    let routing = &config.routing;
    if routing.handler_timeout_secs == 0 {
        fail("routing.handler_timeout_secs must be greater than 0".to_string());
    }

    if routing.request_timeout_secs == 0 {
        fail("routing.request_timeout_secs must be greater than 0".to_string());
    }

    if let Some(min) = routing.min_confidence
        && !(0.0..=1.0).contains(&min)
    {
        fail(format!("routing.min_confidence must be within 0.0..=1.0, got {min}"));
    }

    if routing.apology_message.trim().is_empty() {
        fail("routing.apology_message must not be empty".to_string());
    }

    if routing.cancelled_message.trim().is_empty() {
        fail("routing.cancelled_message must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Twin configuration system.

use twin_config::diagnostic::ConfigError;
use twin_config::model::TwinConfig;
use twin_config::{load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_twin_config() {
    let toml = r#"
[agent]
name = "lucia"
log_level = "debug"

[openai]
api_key = "sk-test"
base_url = "https://example.openai.azure.com/openai/v1"
model = "gpt-4o"
max_retries = 1

[classifier]
temperature = 0.0
max_tokens = 120
fallback_on_parse_error = true

[fallback]
generic_confidence = 0.5
contact_confidence = 0.95

[routing]
handler_timeout_secs = 10
request_timeout_secs = 20
min_confidence = 0.3
include_error_detail = true
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "lucia");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.openai.model, "gpt-4o");
    assert_eq!(config.openai.max_retries, 1);
    assert_eq!(config.classifier.temperature, 0.0);
    assert_eq!(config.classifier.max_tokens, 120);
    assert!(config.classifier.fallback_on_parse_error);
    assert_eq!(config.fallback.generic_confidence, 0.5);
    assert_eq!(config.fallback.contact_confidence, 0.95);
    // Untouched constants keep their calibrated defaults.
    assert_eq!(config.fallback.invoice_confidence, 0.9);
    assert_eq!(config.routing.handler_timeout_secs, 10);
    assert_eq!(config.routing.min_confidence, Some(0.3));
    assert!(config.routing.include_error_detail);
}

#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "twin");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.openai.api_key.is_none());
    assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
    assert_eq!(config.openai.max_retries, 0);
    assert!(config.classifier.model.is_none());
    assert_eq!(config.classifier.reason_max_words, 30);
    assert!(!config.classifier.fallback_on_parse_error);
    assert!(config.routing.min_confidence.is_none());
    assert!(!config.routing.include_error_detail);
}

#[test]
fn fallback_confidence_defaults_match_calibration() {
    let fallback = TwinConfig::default().fallback;
    assert_eq!(fallback.generic_confidence, 0.6);
    assert_eq!(fallback.keyword_confidence, 0.7);
    assert_eq!(fallback.profile_confidence, 0.8);
    assert_eq!(fallback.photo_confidence, 0.8);
    assert_eq!(fallback.document_confidence, 0.8);
    assert_eq!(fallback.invoice_confidence, 0.9);
    assert_eq!(fallback.contact_confidence, 0.9);
}

#[test]
fn dotted_override_reaches_nested_key() {
    use figment::{Figment, providers::Serialized};

    let config: TwinConfig = Figment::new()
        .merge(Serialized::defaults(TwinConfig::default()))
        .merge(("routing.handler_timeout_secs", 5))
        .extract()
        .expect("should set handler timeout via dot notation");

    assert_eq!(config.routing.handler_timeout_secs, 5);
}

#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: TwinConfig = Figment::new()
        .merge(Serialized::defaults(TwinConfig::default()))
        .merge(Toml::file("/nonexistent/path/twin.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.agent.name, "twin");
}

#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[telegram]
bot_token = "abc"
"#;

    let err = load_config_from_str(toml).expect_err("unknown section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("telegram"),
        "error should mention unknown field, got: {err_str}"
    );
}

#[test]
fn unknown_routing_key_gets_suggestion() {
    let toml = r#"
[routing]
min_confidnce = 0.4
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_suggestion = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "min_confidnce"
                && suggestion.as_deref() == Some("min_confidence")
                && valid_keys.contains("handler_timeout_secs")
        })
    });
    assert!(has_suggestion, "expected UnknownKey with suggestion, got: {errors:?}");
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[routing]
handler_timeout_secs = "soon"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got: {errors:?}"
    );
}

#[test]
fn validation_rejects_out_of_range_min_confidence() {
    let toml = r#"
[routing]
min_confidence = 1.7
"#;

    let errors = load_and_validate_str(toml).expect_err("out of range should fail");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("routing.min_confidence"))
    }));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "naem".to_string(),
        suggestion: Some("name".to_string()),
        valid_keys: "name, log_level".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `name`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("naem"));
}

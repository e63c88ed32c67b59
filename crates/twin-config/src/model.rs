// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Twin routing backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Twin configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TwinConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// OpenAI-compatible completion backend settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Primary (model-driven) classifier settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Calibrated confidence constants of the keyword fallback classifier.
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Dispatch, deadline and user-facing failure text settings.
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// Agent identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the twin.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "twin".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OpenAI-compatible chat-completions backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the API; `/chat/completions` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default model (or deployment) name.
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Maximum tokens to generate for handler answers.
    #[serde(default = "default_openai_max_tokens")]
    pub max_tokens: u32,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_openai_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries on transient HTTP errors (429/5xx). Zero means one attempt.
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_openai_model(),
            max_tokens: default_openai_max_tokens(),
            timeout_secs: default_openai_timeout_secs(),
            max_retries: 0,
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_max_tokens() -> u32 {
    2048
}

fn default_openai_timeout_secs() -> u64 {
    60
}

/// Primary classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Model override for classification. `None` uses `openai.model`.
    #[serde(default)]
    pub model: Option<String>,

    /// Sampling temperature for the classification call (kept low).
    #[serde(default = "default_classifier_temperature")]
    pub temperature: f32,

    /// Maximum tokens for the six-line protocol answer.
    #[serde(default = "default_classifier_max_tokens")]
    pub max_tokens: u32,

    /// Word limit applied to the classification reason.
    #[serde(default = "default_reason_max_words")]
    pub reason_max_words: usize,

    /// Run the keyword fallback when the model answer has no recognizable key.
    /// Content-policy refusals always trigger the fallback.
    #[serde(default)]
    pub fallback_on_parse_error: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: default_classifier_temperature(),
            max_tokens: default_classifier_max_tokens(),
            reason_max_words: default_reason_max_words(),
            fallback_on_parse_error: false,
        }
    }
}

fn default_classifier_temperature() -> f32 {
    0.1
}

fn default_classifier_max_tokens() -> u32 {
    150
}

fn default_reason_max_words() -> usize {
    30
}

/// Confidence constants reported by the keyword fallback classifier.
///
/// These are calibrated design constants per rule family, not computed scores.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FallbackConfig {
    /// No keyword family matched.
    #[serde(default = "default_generic_confidence")]
    pub generic_confidence: f32,

    /// A weak (general) keyword of any family matched.
    #[serde(default = "default_keyword_confidence")]
    pub keyword_confidence: f32,

    #[serde(default = "default_invoice_confidence")]
    pub invoice_confidence: f32,

    #[serde(default = "default_document_confidence")]
    pub document_confidence: f32,

    #[serde(default = "default_profile_confidence")]
    pub profile_confidence: f32,

    #[serde(default = "default_contact_confidence")]
    pub contact_confidence: f32,

    #[serde(default = "default_photo_confidence")]
    pub photo_confidence: f32,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            generic_confidence: default_generic_confidence(),
            keyword_confidence: default_keyword_confidence(),
            invoice_confidence: default_invoice_confidence(),
            document_confidence: default_document_confidence(),
            profile_confidence: default_profile_confidence(),
            contact_confidence: default_contact_confidence(),
            photo_confidence: default_photo_confidence(),
        }
    }
}

fn default_generic_confidence() -> f32 {
    0.6
}

fn default_keyword_confidence() -> f32 {
    0.7
}

fn default_invoice_confidence() -> f32 {
    0.9
}

fn default_document_confidence() -> f32 {
    0.8
}

fn default_profile_confidence() -> f32 {
    0.8
}

fn default_contact_confidence() -> f32 {
    0.9
}

fn default_photo_confidence() -> f32 {
    0.8
}

/// Routing configuration.
///
/// Controls handler deadlines, the optional low-confidence policy applied
/// before dispatch, and the text returned when a request cannot be answered.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Maximum seconds a single handler call may take.
    #[serde(default = "default_handler_timeout_secs")]
    pub handler_timeout_secs: u64,

    /// Deadline in seconds for the whole classify-and-route request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Reroute successful classifications below this confidence to Generic.
    /// `None` disables the policy.
    #[serde(default)]
    pub min_confidence: Option<f32>,

    /// Text returned when a handler fails, panics or times out.
    #[serde(default = "default_apology_message")]
    pub apology_message: String,

    /// Text returned when the request is cancelled or misses its deadline.
    #[serde(default = "default_cancelled_message")]
    pub cancelled_message: String,

    /// Append the (truncated) handler error to the apology text.
    #[serde(default)]
    pub include_error_detail: bool,

    /// Character limit for the appended error detail.
    #[serde(default = "default_max_error_detail_chars")]
    pub max_error_detail_chars: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            handler_timeout_secs: default_handler_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            min_confidence: None,
            apology_message: default_apology_message(),
            cancelled_message: default_cancelled_message(),
            include_error_detail: false,
            max_error_detail_chars: default_max_error_detail_chars(),
        }
    }
}

fn default_handler_timeout_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    90
}

fn default_apology_message() -> String {
    "Sorry, I could not process your question right now. Please try again later.".to_string()
}

fn default_cancelled_message() -> String {
    "The request was cancelled before an answer was ready.".to_string()
}

fn default_max_error_detail_chars() -> usize {
    200
}

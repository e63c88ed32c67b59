// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Twin routing backend.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across Twin adapters, classifiers and handlers.
#[derive(Debug, Error)]
pub enum TwinError {
    /// Configuration errors (invalid TOML, missing handlers, bad header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Completion backend failures (network, non-success status, malformed body).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The completion backend refused to answer because of content filtering.
    ///
    /// Kept separate from [`TwinError::Provider`] so the fallback decision is a
    /// variant match rather than message inspection.
    #[error("content policy blocked: {message}")]
    ContentPolicy { message: String },

    /// A downstream intent handler failed.
    #[error("handler error: {message}")]
    Handler {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// The request was cancelled by its caller.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TwinError {
    /// Returns true when the backend reported a content-filter refusal.
    pub fn is_content_policy(&self) -> bool {
        matches!(self, TwinError::ContentPolicy { .. })
    }
}

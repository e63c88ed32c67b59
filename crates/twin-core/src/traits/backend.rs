// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion backend trait for hosted language-model integrations.

use async_trait::async_trait;

use crate::error::TwinError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse};

/// Opaque text-in/text-out access to a hosted chat-completion model.
///
/// Implementations must report content-filter refusals as
/// [`TwinError::ContentPolicy`] and every other failure as
/// [`TwinError::Provider`] or [`TwinError::Timeout`].
#[async_trait]
pub trait CompletionBackend: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, TwinError>;
}

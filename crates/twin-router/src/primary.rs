// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language-model classification call.

use std::sync::Arc;

use tracing::debug;
use twin_config::model::ClassifierConfig;
use twin_core::{ChatMessage, CompletionBackend, CompletionRequest, SessionId, TwinError};

use crate::prompt::{build_instructions, question_message};

/// Sends one question to the completion backend with the classification
/// instructions and returns the raw answer text.
pub struct PrimaryClassifier {
    backend: Arc<dyn CompletionBackend>,
    instructions: String,
    config: ClassifierConfig,
}

impl PrimaryClassifier {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: ClassifierConfig) -> Self {
        Self {
            instructions: build_instructions(config.reason_max_words),
            backend,
            config,
        }
    }

    /// One request, no retries. Backend errors are returned unchanged so the
    /// caller can tell a content-policy refusal from a transport failure.
    pub async fn request(&self, question: &str, session_id: &SessionId) -> Result<String, TwinError> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            system_prompt: Some(self.instructions.clone()),
            messages: vec![ChatMessage::user(question_message(question))],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(
            session_id = %session_id,
            backend = self.backend.name(),
            "requesting intent classification"
        );
        let response = self.backend.complete(request).await?;
        debug!(
            session_id = %session_id,
            output_tokens = response.usage.output_tokens,
            finish_reason = ?response.finish_reason,
            "classification answer received"
        );
        Ok(response.content)
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }
}

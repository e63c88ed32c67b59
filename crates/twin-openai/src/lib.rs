// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible completion backend for Twin.
//!
//! This crate implements [`CompletionBackend`] over the Chat Completions API.
//! Refusals on content-policy grounds surface as
//! [`TwinError::ContentPolicy`], whether reported as an HTTP error or as a
//! `content_filter` finish reason.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};
use twin_config::model::OpenAiConfig;
use twin_core::{
    AdapterType, CompletionBackend, CompletionRequest, CompletionResponse, HealthStatus,
    PluginAdapter, TokenUsage, TwinError,
};

use crate::client::OpenAiClient;
use crate::types::{ApiMessage, ChatCompletionRequest};

/// Environment variable consulted when `openai.api_key` is unset.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat Completions backend implementing [`CompletionBackend`].
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
pub struct OpenAiBackend {
    client: OpenAiClient,
    default_model: String,
}

impl OpenAiBackend {
    pub fn new(config: &OpenAiConfig) -> Result<Self, TwinError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = OpenAiClient::new(
            &api_key,
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )?;

        info!(
            model = config.model,
            endpoint = client.endpoint(),
            "OpenAI backend initialized"
        );

        Ok(Self {
            client,
            default_model: config.model.clone(),
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    fn to_api_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let system = request.system_prompt.iter().map(|prompt| ApiMessage {
            role: "system".to_string(),
            content: prompt.clone(),
        });
        let turns = request.messages.iter().map(|message| ApiMessage {
            role: message.role.clone(),
            content: message.content.clone(),
        });

        ChatCompletionRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.default_model.clone()),
            messages: system.chain(turns).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, TwinError> {
        // No request is made; a probe would consume tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TwinError> {
        debug!("OpenAI backend shutting down");
        Ok(())
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, TwinError> {
        let api_request = self.to_api_request(&request);
        let response = self.client.chat_completion(&api_request).await?;

        let choice = response.choices.into_iter().next().ok_or_else(|| TwinError::Provider {
            message: "API response contained no choices".into(),
            source: None,
        })?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(TwinError::ContentPolicy {
                message: "completion stopped by content filter".into(),
            });
        }

        let usage = response.usage.unwrap_or_default();
        Ok(CompletionResponse {
            id: response.id,
            content: choice.message.content.unwrap_or_default(),
            model: response.model,
            finish_reason: choice.finish_reason,
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, TwinError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var(API_KEY_ENV).map_err(|_| {
        TwinError::Config(format!(
            "OpenAI API key not found. Set openai.api_key in config or the {API_KEY_ENV} environment variable."
        ))
    })
}

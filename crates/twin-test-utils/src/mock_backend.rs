// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion backend for deterministic testing.
//!
//! `MockBackend` implements `CompletionBackend` with scripted replies,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use twin_core::{
    AdapterType, CompletionBackend, CompletionRequest, CompletionResponse, HealthStatus,
    PluginAdapter, TokenUsage, TwinError,
};
use twin_router::{Intent, IntentDecision, format_response};

/// One scripted backend outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A successful completion with this text.
    Text(String),
    /// A content-policy refusal.
    ContentBlocked,
    /// A provider failure with this message.
    Transport(String),
    /// Wait this long, then answer with the default text.
    Stall(Duration),
}

impl MockReply {
    /// A well-formed classification answer.
    pub fn classification(intent: Intent, confidence: f32) -> Self {
        Self::decision(&IntentDecision {
            intent,
            confidence,
            reason: format!("mock {intent}"),
            ..IntentDecision::default()
        })
    }

    /// A classification answer for a full decision.
    pub fn decision(decision: &IntentDecision) -> Self {
        Self::Text(format_response(decision))
    }
}

/// A mock backend that returns scripted replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
pub struct MockBackend {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            requests: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn push_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Number of `complete` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_reply(&self) -> Option<MockReply> {
        self.replies.lock().await.pop_front()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, TwinError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TwinError> {
        Ok(())
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, TwinError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let model = request.model.clone().unwrap_or_else(|| "mock-model".to_string());
        self.requests.lock().await.push(request);

        let text = match self.next_reply().await {
            Some(MockReply::Text(text)) => text,
            Some(MockReply::ContentBlocked) => {
                return Err(TwinError::ContentPolicy {
                    message: "mock content filter".to_string(),
                });
            }
            Some(MockReply::Transport(message)) => {
                return Err(TwinError::Provider {
                    message,
                    source: None,
                });
            }
            Some(MockReply::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                "mock response".to_string()
            }
            None => "mock response".to_string(),
        };

        Ok(CompletionResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            content: text,
            model,
            finish_reason: Some("stop".to_string()),
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twin_core::ChatMessage;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: None,
            system_prompt: None,
            messages: vec![ChatMessage::user("hola")],
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let backend = MockBackend::new();
        let response = backend.complete(request()).await.unwrap();
        assert_eq!(response.content, "mock response");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn queued_replies_returned_in_order() {
        let backend = MockBackend::with_replies(vec![
            MockReply::Text("first".into()),
            MockReply::ContentBlocked,
            MockReply::Transport("reset".into()),
        ]);
        assert_eq!(backend.complete(request()).await.unwrap().content, "first");
        assert!(backend.complete(request()).await.unwrap_err().is_content_policy());
        assert!(matches!(
            backend.complete(request()).await.unwrap_err(),
            TwinError::Provider { .. }
        ));
        assert_eq!(backend.requests().await.len(), 3);
    }

    #[tokio::test]
    async fn classification_reply_is_protocol_text() {
        let MockReply::Text(text) = MockReply::classification(Intent::PhotoSearch, 0.8) else {
            panic!("expected text reply");
        };
        assert!(text.starts_with("INTENT: PhotoSearch"));
        assert!(text.contains("CONFIDENCE: 0.80"));
    }
}

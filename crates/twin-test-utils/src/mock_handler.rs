// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent handlers with scripted behavior.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use twin_core::{SessionId, TwinError};
use twin_router::{ClassificationResult, IntentHandler};

/// One handler invocation as seen by [`RecordingHandler`].
#[derive(Debug, Clone)]
pub struct HandledCall {
    pub question: String,
    pub session_id: SessionId,
    pub classification: ClassificationResult,
}

/// Answers `[<intent>] <question>` and records every call.
#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<HandledCall>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<HandledCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl IntentHandler for RecordingHandler {
    fn name(&self) -> &str {
        "recording"
    }

    async fn handle(
        &self,
        question: &str,
        session_id: &SessionId,
        classification: &ClassificationResult,
    ) -> Result<String, TwinError> {
        self.calls.lock().await.push(HandledCall {
            question: question.to_string(),
            session_id: session_id.clone(),
            classification: classification.clone(),
        });
        Ok(format!("[{}] {question}", classification.intent()))
    }
}

/// Always fails with a handler error.
pub struct FailingHandler {
    pub message: String,
}

#[async_trait]
impl IntentHandler for FailingHandler {
    fn name(&self) -> &str {
        "failing"
    }

    async fn handle(
        &self,
        _question: &str,
        _session_id: &SessionId,
        _classification: &ClassificationResult,
    ) -> Result<String, TwinError> {
        Err(TwinError::Handler {
            message: self.message.clone(),
            source: None,
        })
    }
}

/// Panics on every call.
pub struct PanickingHandler;

#[async_trait]
impl IntentHandler for PanickingHandler {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn handle(
        &self,
        _question: &str,
        _session_id: &SessionId,
        _classification: &ClassificationResult,
    ) -> Result<String, TwinError> {
        panic!("handler bug")
    }
}

/// Sleeps before answering.
pub struct SlowHandler {
    pub delay: Duration,
}

#[async_trait]
impl IntentHandler for SlowHandler {
    fn name(&self) -> &str {
        "slow"
    }

    async fn handle(
        &self,
        question: &str,
        _session_id: &SessionId,
        _classification: &ClassificationResult,
    ) -> Result<String, TwinError> {
        tokio::time::sleep(self.delay).await;
        Ok(format!("slow answer to {question}"))
    }
}

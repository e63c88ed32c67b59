// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end routing tests.
//!
//! `TestHarness` assembles a complete pipeline around a [`MockBackend`] and a
//! shared [`RecordingHandler`], with per-intent handler overrides.

use std::sync::Arc;

use twin_config::TwinConfig;
use twin_core::{SessionId, TwinError};
use twin_router::{Dispatcher, Intent, IntentClassifier, IntentHandler, IntentPipeline};

use crate::mock_backend::{MockBackend, MockReply};
use crate::mock_handler::RecordingHandler;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    config: TwinConfig,
    overrides: Vec<(Intent, Arc<dyn IntentHandler>)>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            config: TwinConfig::default(),
            overrides: Vec::new(),
        }
    }

    /// Set scripted backend replies.
    pub fn with_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies = replies;
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: TwinConfig) -> Self {
        self.config = config;
        self
    }

    /// Adjust the configuration in place.
    pub fn configure(mut self, edit: impl FnOnce(&mut TwinConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    /// Use `handler` for `intent` instead of the recording handler.
    pub fn with_handler(mut self, intent: Intent, handler: Arc<dyn IntentHandler>) -> Self {
        self.overrides.push((intent, handler));
        self
    }

    pub fn build(self) -> Result<TestHarness, TwinError> {
        let backend = Arc::new(MockBackend::with_replies(self.replies));
        let recorder = Arc::new(RecordingHandler::new());

        let classifier = IntentClassifier::new(
            backend.clone(),
            self.config.classifier.clone(),
            self.config.fallback.clone(),
        );

        let mut dispatcher = Dispatcher::builder(self.config.routing.clone());
        for (intent, handler) in self.overrides {
            dispatcher = dispatcher.handler(intent, handler);
        }
        let dispatcher = dispatcher.default_handler(recorder.clone()).build()?;

        let pipeline = IntentPipeline::new(classifier, dispatcher, self.config.routing.clone());

        Ok(TestHarness {
            backend,
            recorder,
            pipeline,
            config: self.config,
        })
    }
}

/// A complete routing environment with a mock backend.
pub struct TestHarness {
    /// The mock completion backend.
    pub backend: Arc<MockBackend>,
    /// Handler for every intent without an override.
    pub recorder: Arc<RecordingHandler>,
    pub pipeline: IntentPipeline,
    pub config: TwinConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Route `question` in a fresh session.
    pub async fn ask(&self, question: &str) -> String {
        self.pipeline
            .route_question(question, &new_session_id())
            .await
    }

    /// Route `question` in `session_id`.
    pub async fn ask_in(&self, session_id: &SessionId, question: &str) -> String {
        self.pipeline.route_question(question, session_id).await
    }
}

/// A random session id for tests that do not care about sessions.
pub fn new_session_id() -> SessionId {
    SessionId::from(format!("test-{}", uuid::Uuid::new_v4()))
}

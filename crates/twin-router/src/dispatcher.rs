// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent to handler dispatch.
//!
//! The table is total: [`DispatcherBuilder::build`] refuses to produce a
//! dispatcher unless every [`Intent`] has a handler. Handler failures,
//! timeouts and panics never escape; the caller always gets text back.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use twin_config::model::RoutingConfig;
use twin_core::TwinError;

use crate::classification::{ClassificationResult, Intent};
use crate::handler::IntentHandler;

/// Collects one handler per intent.
pub struct DispatcherBuilder {
    handlers: [Option<Arc<dyn IntentHandler>>; Intent::COUNT],
    config: RoutingConfig,
}

impl DispatcherBuilder {
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            handlers: Default::default(),
            config,
        }
    }

    /// Register `handler` for `intent`, replacing any earlier registration.
    pub fn handler(mut self, intent: Intent, handler: Arc<dyn IntentHandler>) -> Self {
        self.handlers[intent.index()] = Some(handler);
        self
    }

    /// Register the same handler for every intent that has none yet.
    pub fn default_handler(mut self, handler: Arc<dyn IntentHandler>) -> Self {
        for slot in self.handlers.iter_mut().filter(|slot| slot.is_none()) {
            *slot = Some(handler.clone());
        }
        self
    }

    pub fn build(self) -> Result<Dispatcher, TwinError> {
        let missing: Vec<String> = Intent::ALL
            .iter()
            .filter(|intent| self.handlers[intent.index()].is_none())
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(TwinError::Config(format!(
                "no handler registered for intents: {}",
                missing.join(", ")
            )));
        }

        let handlers: Vec<Arc<dyn IntentHandler>> = self.handlers.into_iter().flatten().collect();
        let handlers: [Arc<dyn IntentHandler>; Intent::COUNT] = handlers
            .try_into()
            .map_err(|_| TwinError::Internal("handler table size mismatch".into()))?;

        Ok(Dispatcher {
            handlers,
            handler_timeout: Duration::from_secs(self.config.handler_timeout_secs),
            config: self.config,
        })
    }
}

/// Routes a classified question to its handler.
pub struct Dispatcher {
    handlers: [Arc<dyn IntentHandler>; Intent::COUNT],
    handler_timeout: Duration,
    config: RoutingConfig,
}

impl Dispatcher {
    pub fn builder(config: RoutingConfig) -> DispatcherBuilder {
        DispatcherBuilder::new(config)
    }

    /// The handler registered for `intent`. Total over all intents.
    pub fn handler_for(&self, intent: Intent) -> &Arc<dyn IntentHandler> {
        &self.handlers[intent.index()]
    }

    /// Invoke the handler for `classification.intent()` exactly once and
    /// return its answer, or a bounded apology if it fails.
    pub async fn dispatch(
        &self,
        question: &str,
        classification: &ClassificationResult,
        cancel: &CancellationToken,
    ) -> String {
        let intent = classification.intent();
        let handler = self.handler_for(intent);
        let session_id = classification.session_id();

        info!(
            session_id = %session_id,
            intent = %intent,
            handler = handler.name(),
            "dispatching question"
        );

        let call = AssertUnwindSafe(handler.handle(question, session_id, classification)).catch_unwind();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(session_id = %session_id, "request cancelled before handler finished");
                return self.config.cancelled_message.clone();
            }
            outcome = tokio::time::timeout(self.handler_timeout, call) => outcome,
        };

        match outcome {
            Ok(Ok(Ok(answer))) => answer,
            Ok(Ok(Err(err))) => {
                warn!(session_id = %session_id, handler = handler.name(), error = %err, "handler failed");
                self.apology(&err.to_string())
            }
            Ok(Err(panic)) => {
                let detail = panic_message(panic.as_ref());
                error!(session_id = %session_id, handler = handler.name(), panic = %detail, "handler panicked");
                self.apology(&detail)
            }
            Err(_) => {
                let err = TwinError::Timeout {
                    duration: self.handler_timeout,
                };
                warn!(session_id = %session_id, handler = handler.name(), "handler timed out");
                self.apology(&err.to_string())
            }
        }
    }

    /// The configured apology, with a truncated failure detail when enabled.
    fn apology(&self, detail: &str) -> String {
        if !self.config.include_error_detail || detail.is_empty() {
            return self.config.apology_message.clone();
        }
        let detail: String = detail.chars().take(self.config.max_error_detail_chars).collect();
        format!("{} ({detail})", self.config.apology_message)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use twin_core::SessionId;

    use super::*;
    use crate::classification::{ClassificationSource, ErrorKind, IntentDecision};

    enum Behavior {
        Answer,
        Fail,
        Panic,
        Sleep,
    }

    struct TestHandler {
        label: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl TestHandler {
        fn new(label: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                label,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl IntentHandler for TestHandler {
        fn name(&self) -> &str {
            self.label
        }

        async fn handle(
            &self,
            question: &str,
            _session_id: &SessionId,
            _classification: &ClassificationResult,
        ) -> Result<String, TwinError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Answer => Ok(format!("{}: {question}", self.label)),
                Behavior::Fail => Err(TwinError::Handler {
                    message: "database unavailable".into(),
                    source: None,
                }),
                Behavior::Panic => panic!("boom"),
                Behavior::Sleep => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("late".into())
                }
            }
        }
    }

    fn classified(intent: Intent) -> ClassificationResult {
        ClassificationResult::from_decision(
            IntentDecision {
                intent,
                confidence: 0.9,
                ..IntentDecision::default()
            },
            "question",
            &SessionId::from("s"),
            ClassificationSource::Model,
            ErrorKind::None,
            30,
        )
    }

    fn dispatcher_with(handler: Arc<TestHandler>, config: RoutingConfig) -> Dispatcher {
        Dispatcher::builder(config)
            .default_handler(handler)
            .build()
            .expect("complete table")
    }

    #[test]
    fn build_reports_missing_intents() {
        let err = Dispatcher::builder(RoutingConfig::default())
            .handler(Intent::Generic, TestHandler::new("g", Behavior::Answer))
            .handler(Intent::PhotoSearch, TestHandler::new("p", Behavior::Answer))
            .build()
            .err()
            .expect("incomplete table must fail");
        let message = err.to_string();
        assert!(message.contains("InvoiceSearch"), "{message}");
        assert!(message.contains("ContactSearch"), "{message}");
        assert!(!message.contains("PhotoSearch"), "{message}");
    }

    #[tokio::test]
    async fn each_intent_reaches_its_own_handler() {
        let mut builder = Dispatcher::builder(RoutingConfig::default());
        let labels = ["generic", "invoice", "document", "profile", "contact", "photo"];
        for (intent, label) in Intent::ALL.into_iter().zip(labels) {
            builder = builder.handler(intent, TestHandler::new(label, Behavior::Answer));
        }
        let dispatcher = builder.build().expect("complete table");

        for (intent, label) in Intent::ALL.into_iter().zip(labels) {
            let answer = dispatcher
                .dispatch("q", &classified(intent), &CancellationToken::new())
                .await;
            assert_eq!(answer, format!("{label}: q"));
        }
    }

    #[tokio::test]
    async fn handler_error_becomes_apology() {
        let handler = TestHandler::new("h", Behavior::Fail);
        let dispatcher = dispatcher_with(handler.clone(), RoutingConfig::default());
        let answer = dispatcher
            .dispatch("q", &classified(Intent::InvoiceSearch), &CancellationToken::new())
            .await;
        assert_eq!(answer, RoutingConfig::default().apology_message);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn error_detail_is_included_and_truncated() {
        let config = RoutingConfig {
            include_error_detail: true,
            max_error_detail_chars: 13,
            ..RoutingConfig::default()
        };
        let dispatcher = dispatcher_with(TestHandler::new("h", Behavior::Fail), config.clone());
        let answer = dispatcher
            .dispatch("q", &classified(Intent::Generic), &CancellationToken::new())
            .await;
        assert_eq!(answer, format!("{} (handler error)", config.apology_message));
    }

    #[tokio::test]
    async fn panicking_handler_is_contained() {
        let dispatcher = dispatcher_with(TestHandler::new("h", Behavior::Panic), RoutingConfig::default());
        let answer = dispatcher
            .dispatch("q", &classified(Intent::ContactSearch), &CancellationToken::new())
            .await;
        assert_eq!(answer, RoutingConfig::default().apology_message);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_handler_times_out() {
        let config = RoutingConfig {
            handler_timeout_secs: 2,
            ..RoutingConfig::default()
        };
        let dispatcher = dispatcher_with(TestHandler::new("h", Behavior::Sleep), config);
        let answer = dispatcher
            .dispatch("q", &classified(Intent::PhotoSearch), &CancellationToken::new())
            .await;
        assert_eq!(answer, RoutingConfig::default().apology_message);
    }

    #[tokio::test]
    async fn cancelled_request_does_not_run_handler() {
        let handler = TestHandler::new("h", Behavior::Answer);
        let dispatcher = dispatcher_with(handler.clone(), RoutingConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let answer = dispatcher
            .dispatch("q", &classified(Intent::Generic), &cancel)
            .await;
        assert_eq!(answer, RoutingConfig::default().cancelled_message);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn panic_payloads_are_described() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "handler panicked");
    }
}

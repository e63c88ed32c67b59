// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `route_question` entry point: classify, then dispatch.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use twin_config::model::RoutingConfig;
use twin_core::SessionId;

use crate::classification::{ClassificationResult, Intent};
use crate::classifier::IntentClassifier;
use crate::dispatcher::Dispatcher;

/// Classifies a question and hands it to the matching handler.
///
/// Holds no per-request state, so one pipeline serves any number of
/// concurrent requests.
pub struct IntentPipeline {
    classifier: IntentClassifier,
    dispatcher: Dispatcher,
    config: RoutingConfig,
}

impl IntentPipeline {
    pub fn new(classifier: IntentClassifier, dispatcher: Dispatcher, config: RoutingConfig) -> Self {
        Self {
            classifier,
            dispatcher,
            config,
        }
    }

    /// Classify without dispatching. Empty questions are `Generic` without a
    /// model call.
    pub async fn classify(
        &self,
        question: &str,
        session_id: &SessionId,
        cancel: &CancellationToken,
    ) -> ClassificationResult {
        if question.trim().is_empty() {
            return ClassificationResult::unclassified(question, session_id, "empty question");
        }
        self.classifier.classify(question, session_id, cancel).await
    }

    /// Answer `question` for `session_id`. Always returns text.
    pub async fn route_question(&self, question: &str, session_id: &SessionId) -> String {
        self.route_question_with_cancel(question, session_id, CancellationToken::new())
            .await
    }

    /// Like [`route_question`](Self::route_question), but stops early when
    /// `cancel` fires or the request deadline passes.
    pub async fn route_question_with_cancel(
        &self,
        question: &str,
        session_id: &SessionId,
        cancel: CancellationToken,
    ) -> String {
        let deadline = Duration::from_secs(self.config.request_timeout_secs);
        let request = cancel.child_token();

        match tokio::time::timeout(deadline, self.run(question, session_id, &request)).await {
            Ok(answer) => answer,
            Err(_) => {
                request.cancel();
                warn!(session_id = %session_id, ?deadline, "request deadline exceeded");
                self.config.cancelled_message.clone()
            }
        }
    }

    async fn run(&self, question: &str, session_id: &SessionId, cancel: &CancellationToken) -> String {
        let classification = self.classify(question, session_id, cancel).await;
        if cancel.is_cancelled() {
            info!(session_id = %session_id, "request cancelled after classification");
            return self.config.cancelled_message.clone();
        }

        let classification = self.apply_confidence_floor(classification);
        self.dispatcher.dispatch(question, &classification, cancel).await
    }

    /// Reroute successful but low-confidence classifications to `Generic`
    /// when `routing.min_confidence` is set.
    fn apply_confidence_floor(&self, classification: ClassificationResult) -> ClassificationResult {
        match self.config.min_confidence {
            Some(min)
                if classification.success()
                    && classification.intent() != Intent::Generic
                    && classification.confidence() < min =>
            {
                info!(
                    session_id = %classification.session_id(),
                    intent = %classification.intent(),
                    confidence = classification.confidence(),
                    min_confidence = min,
                    "confidence below floor, routing to Generic"
                );
                let reason = format!(
                    "{} classified with confidence {:.2} below {min:.2}",
                    classification.intent(),
                    classification.confidence()
                );
                classification.rerouted_to_generic(&reason, self.classifier.reason_max_words())
            }
            _ => classification,
        }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

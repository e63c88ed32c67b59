// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification orchestration: model first, keyword fallback on refusal.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use twin_config::model::{ClassifierConfig, FallbackConfig};
use twin_core::{CompletionBackend, SessionId, TwinError};

use crate::classification::{ClassificationResult, ClassificationSource, ErrorKind};
use crate::fallback::FallbackClassifier;
use crate::primary::PrimaryClassifier;
use crate::protocol::parse_response;

/// Turns a question into a [`ClassificationResult`].
///
/// The fallback runs only after the model call has finished and reported a
/// content-policy refusal (or, when configured, an undecodable answer).
/// Transport failures are not masked by the fallback.
pub struct IntentClassifier {
    primary: PrimaryClassifier,
    fallback: FallbackClassifier,
    config: ClassifierConfig,
}

impl IntentClassifier {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        classifier: ClassifierConfig,
        fallback: FallbackConfig,
    ) -> Self {
        Self {
            primary: PrimaryClassifier::new(backend, classifier.clone()),
            fallback: FallbackClassifier::new(fallback),
            config: classifier,
        }
    }

    /// Classify one question. Never fails; problems are reported through
    /// `success` and `error_kind` on the result.
    pub async fn classify(
        &self,
        question: &str,
        session_id: &SessionId,
        cancel: &CancellationToken,
    ) -> ClassificationResult {
        let attempt = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TwinError::Cancelled),
            answer = self.primary.request(question, session_id) => answer,
        };

        let result = match attempt {
            Ok(raw) => {
                let parsed = parse_response(&raw);
                if !parsed.is_all_default() {
                    ClassificationResult::from_decision(
                        parsed.decision,
                        question,
                        session_id,
                        ClassificationSource::Model,
                        ErrorKind::None,
                        self.config.reason_max_words,
                    )
                } else if self.config.fallback_on_parse_error {
                    warn!(session_id = %session_id, "undecodable classification answer, using keyword fallback");
                    self.fallback_result(question, session_id, ErrorKind::ParseError)
                } else {
                    warn!(session_id = %session_id, "undecodable classification answer, defaulting to Generic");
                    ClassificationResult::from_decision(
                        parsed.decision,
                        question,
                        session_id,
                        ClassificationSource::Model,
                        ErrorKind::ParseError,
                        self.config.reason_max_words,
                    )
                }
            }
            Err(err) if err.is_content_policy() => {
                info!(session_id = %session_id, "content policy blocked classification, using keyword fallback");
                self.fallback_result(question, session_id, ErrorKind::ContentPolicyBlocked)
            }
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "classification failed");
                ClassificationResult::failed(
                    question,
                    session_id,
                    ErrorKind::from(&err),
                    &err.to_string(),
                    self.config.reason_max_words,
                )
            }
        };

        info!(
            session_id = %session_id,
            intent = %result.intent(),
            confidence = result.confidence(),
            source = %result.source(),
            error_kind = %result.error_kind(),
            "question classified"
        );
        result
    }

    fn fallback_result(
        &self,
        question: &str,
        session_id: &SessionId,
        error_kind: ErrorKind,
    ) -> ClassificationResult {
        ClassificationResult::from_decision(
            self.fallback.classify(question),
            question,
            session_id,
            ClassificationSource::Fallback,
            error_kind,
            self.config.reason_max_words,
        )
    }

    pub fn primary(&self) -> &PrimaryClassifier {
        &self.primary
    }

    /// Word limit applied to every reason this classifier produces.
    pub fn reason_max_words(&self) -> usize {
        self.config.reason_max_words
    }
}

// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend-backed answer handlers and pipeline assembly.
//!
//! Each intent gets a [`ChatHandler`] with its own instructions. The
//! classification flags and extracted filters are passed to the model as
//! context so it can answer in the right register.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use twin_config::TwinConfig;
use twin_core::{ChatMessage, CompletionBackend, CompletionRequest, SessionId, TwinError};
use twin_router::{
    ClassificationResult, Dispatcher, Intent, IntentClassifier, IntentHandler, IntentPipeline,
};

const ANSWER_TEMPERATURE: f32 = 0.3;

/// Answers questions of one intent with a single completion call.
pub struct ChatHandler {
    intent: Intent,
    name: String,
    backend: Arc<dyn CompletionBackend>,
    system_prompt: String,
    max_tokens: u32,
}

impl ChatHandler {
    pub fn new(intent: Intent, backend: Arc<dyn CompletionBackend>, config: &TwinConfig) -> Self {
        Self {
            intent,
            name: format!("chat-{}", intent.to_string().to_lowercase()),
            backend,
            system_prompt: system_prompt_for(intent, &config.agent.name),
            max_tokens: config.openai.max_tokens,
        }
    }

    fn user_message(question: &str, classification: &ClassificationResult) -> String {
        let mut message = question.trim().to_string();
        let _ = write!(
            message,
            "\n\n[context] intent={} confidence={:.2}",
            classification.intent(),
            classification.confidence()
        );
        if classification.intent() == Intent::DocumentSearch {
            let _ = write!(message, " document_type={}", classification.sub_type());
        }
        if classification.requires_calculation() {
            message.push_str(" calculation=required");
        }
        if classification.requires_filter() {
            let criteria = classification.filter_criteria();
            if !criteria.is_empty() {
                let _ = write!(message, " filters=[{criteria}]");
            }
        }
        message
    }
}

#[async_trait]
impl IntentHandler for ChatHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(
        &self,
        question: &str,
        session_id: &SessionId,
        classification: &ClassificationResult,
    ) -> Result<String, TwinError> {
        debug!(session_id = %session_id, intent = %self.intent, handler = %self.name, "answering with backend");
        let request = CompletionRequest {
            model: None,
            system_prompt: Some(self.system_prompt.clone()),
            messages: vec![ChatMessage::user(Self::user_message(question, classification))],
            max_tokens: self.max_tokens,
            temperature: ANSWER_TEMPERATURE,
        };
        let response = self.backend.complete(request).await?;
        Ok(response.content)
    }
}

fn system_prompt_for(intent: Intent, agent_name: &str) -> String {
    let focus = match intent {
        Intent::Generic => "Answer general questions briefly and honestly.",
        Intent::InvoiceSearch => {
            "Help the user with their invoices, payments and spending. When a calculation is \
             required, show the figures you used."
        }
        Intent::DocumentSearch => {
            "Help the user find their formal documents such as contracts, licenses and \
             certificates, and mention expiry dates when relevant."
        }
        Intent::ProfileSearch => "Answer questions about the user's own personal data.",
        Intent::ContactSearch => {
            "Help the user find people in their contacts and their phone, email or address."
        }
        Intent::PhotoSearch => "Help the user find photos by place, date, event or people.",
    };
    format!(
        "You are {agent_name}, a concise personal assistant. {focus} Reply in the language of \
         the question."
    )
}

/// Assemble the full pipeline: classifier plus one chat handler per intent.
pub fn build_pipeline(
    config: &TwinConfig,
    backend: Arc<dyn CompletionBackend>,
) -> Result<IntentPipeline, TwinError> {
    let classifier = IntentClassifier::new(
        backend.clone(),
        config.classifier.clone(),
        config.fallback.clone(),
    );

    let dispatcher = Intent::ALL
        .into_iter()
        .fold(Dispatcher::builder(config.routing.clone()), |builder, intent| {
            let handler: Arc<dyn IntentHandler> =
                Arc::new(ChatHandler::new(intent, backend.clone(), config));
            builder.handler(intent, handler)
        })
        .build()?;

    Ok(IntentPipeline::new(
        classifier,
        dispatcher,
        config.routing.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use twin_router::{ClassificationSource, DocumentSubType, ErrorKind, IntentDecision};
    use twin_test_utils::{MockBackend, MockReply};

    fn classified(question: &str, decision: IntentDecision) -> ClassificationResult {
        ClassificationResult::from_decision(
            decision,
            question,
            &SessionId::from("s"),
            ClassificationSource::Model,
            ErrorKind::None,
            30,
        )
    }

    #[test]
    fn context_line_carries_flags_and_filters() {
        let question = "¿Cuánto gasté en Iberdrola en 2024?";
        let classification = classified(
            question,
            IntentDecision {
                intent: Intent::InvoiceSearch,
                requires_calculation: true,
                requires_filter: true,
                confidence: 0.9,
                ..IntentDecision::default()
            },
        );
        let message = ChatHandler::user_message(question, &classification);
        assert!(message.starts_with(question));
        assert!(message.contains("intent=InvoiceSearch confidence=0.90"));
        assert!(message.contains("calculation=required"));
        assert!(message.contains("filters=[vendor=Iberdrola, year=2024]"));
    }

    #[test]
    fn document_context_names_the_sub_type() {
        let classification = classified(
            "mi contrato",
            IntentDecision {
                intent: Intent::DocumentSearch,
                sub_type: DocumentSubType::Contracts,
                ..IntentDecision::default()
            },
        );
        let message = ChatHandler::user_message("mi contrato", &classification);
        assert!(message.contains("document_type=Contracts"));
    }

    #[test]
    fn every_intent_has_its_own_instructions() {
        let prompts: std::collections::HashSet<String> = Intent::ALL
            .into_iter()
            .map(|intent| system_prompt_for(intent, "twin"))
            .collect();
        assert_eq!(prompts.len(), Intent::COUNT);
    }

    #[tokio::test]
    async fn handler_sends_system_prompt_and_returns_content() {
        let backend = Arc::new(MockBackend::with_replies(vec![MockReply::Text(
            "Tu email es ana@example.com".into(),
        )]));
        let handler = ChatHandler::new(Intent::ProfileSearch, backend.clone(), &TwinConfig::default());
        let classification = classified(
            "¿Cuál es mi email?",
            IntentDecision {
                intent: Intent::ProfileSearch,
                confidence: 0.8,
                ..IntentDecision::default()
            },
        );

        let answer = handler
            .handle("¿Cuál es mi email?", &SessionId::from("s"), &classification)
            .await
            .unwrap();
        assert_eq!(answer, "Tu email es ana@example.com");

        let requests = backend.requests().await;
        let system = requests[0].system_prompt.as_deref().unwrap();
        assert!(system.contains("own personal data"));
    }

    #[tokio::test]
    async fn pipeline_classifies_then_answers() {
        let backend = Arc::new(MockBackend::with_replies(vec![
            MockReply::classification(Intent::PhotoSearch, 0.85),
            MockReply::Text("Encontré 12 fotos de Roma".into()),
        ]));
        let pipeline = build_pipeline(&TwinConfig::default(), backend.clone()).unwrap();

        let answer = pipeline
            .route_question("fotos de Roma", &SessionId::from("s"))
            .await;
        assert_eq!(answer, "Encontré 12 fotos de Roma");
        assert_eq!(backend.call_count(), 2);
    }
}

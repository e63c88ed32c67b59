// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot `twin classify` and `twin ask` commands.

use std::sync::Arc;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;
use twin_config::TwinConfig;
use twin_core::{CompletionBackend, SessionId, TwinError};
use twin_openai::OpenAiBackend;
use twin_router::{ClassificationResult, ClassificationSource, ErrorKind, FallbackClassifier};

use crate::handlers::build_pipeline;

/// Classify `question` and print the result with its filter criteria.
pub async fn run_classify(
    config: &TwinConfig,
    question: &str,
    session: Option<String>,
    offline: bool,
) -> Result<(), TwinError> {
    let session_id = session_or_new(session);

    let result = if offline {
        keyword_only(config, question, &session_id)
    } else {
        let pipeline = build_pipeline(config, openai_backend(config)?)?;
        pipeline
            .classify(question, &session_id, &CancellationToken::new())
            .await
    };

    println!("{}", render_classification(&result)?);
    Ok(())
}

/// Answer `question` end to end. Ctrl+C cancels the request.
pub async fn run_ask(
    config: &TwinConfig,
    question: &str,
    session: Option<String>,
) -> Result<(), TwinError> {
    let session_id = session_or_new(session);
    let pipeline = build_pipeline(config, openai_backend(config)?)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling request");
            on_interrupt.cancel();
        }
    });

    let answer = pipeline
        .route_question_with_cancel(question, &session_id, cancel)
        .await;
    println!("{answer}");
    Ok(())
}

/// Build the OpenAI backend. Failures are reported by the caller as they are.
pub(crate) fn openai_backend(config: &TwinConfig) -> Result<Arc<dyn CompletionBackend>, TwinError> {
    Ok(Arc::new(OpenAiBackend::new(&config.openai)?))
}

pub(crate) fn session_or_new(session: Option<String>) -> SessionId {
    session
        .map(SessionId::from)
        .unwrap_or_else(|| SessionId::from(format!("cli-{}", uuid::Uuid::new_v4())))
}

fn keyword_only(config: &TwinConfig, question: &str, session_id: &SessionId) -> ClassificationResult {
    if question.trim().is_empty() {
        return ClassificationResult::unclassified(question, session_id, "empty question");
    }
    ClassificationResult::from_decision(
        FallbackClassifier::new(config.fallback.clone()).classify(question),
        question,
        session_id,
        ClassificationSource::Fallback,
        ErrorKind::None,
        config.classifier.reason_max_words,
    )
}

fn render_classification(result: &ClassificationResult) -> Result<String, TwinError> {
    let document = json!({
        "classification": result,
        "filter_criteria": result.filter_criteria(),
    });
    serde_json::to_string_pretty(&document)
        .map_err(|e| TwinError::Internal(format!("failed to render classification: {e}")))
}

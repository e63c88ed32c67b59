// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `twin shell` command implementation.
//!
//! Interactive REPL with a colored prompt and readline history. Every line
//! is routed through the full pipeline in one session per invocation.
//! `/classify <question>` shows the classification without answering.

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use twin_config::TwinConfig;
use twin_core::{SessionId, TwinError};
use twin_router::{ClassificationResult, IntentPipeline};

use crate::commands::{openai_backend, session_or_new};
use crate::handlers::build_pipeline;

/// A parsed REPL line.
#[derive(Debug, PartialEq, Eq)]
enum ShellInput<'a> {
    Quit,
    Skip,
    Classify(&'a str),
    Ask(&'a str),
}

fn parse_line(line: &str) -> ShellInput<'_> {
    let trimmed = line.trim();
    if trimmed == "/quit" || trimmed == "/exit" {
        return ShellInput::Quit;
    }
    if trimmed.is_empty() {
        return ShellInput::Skip;
    }
    match trimmed.strip_prefix("/classify") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
            ShellInput::Classify(rest.trim())
        }
        _ => ShellInput::Ask(trimmed),
    }
}

/// Runs the `twin shell` interactive REPL.
pub async fn run_shell(config: &TwinConfig) -> Result<(), TwinError> {
    let pipeline = build_pipeline(config, openai_backend(config)?)?;
    let session_id = session_or_new(None);
    debug!(session_id = %session_id, "shell session started");

    let mut rl = DefaultEditor::new()
        .map_err(|e| TwinError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.agent.name).bold().green());
    println!(
        "Type {} to inspect a question, {} to exit.\n",
        "/classify <question>".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", config.agent.name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => match parse_line(&line) {
                ShellInput::Quit => break,
                ShellInput::Skip => continue,
                ShellInput::Classify(question) => {
                    let _ = rl.add_history_entry(&line);
                    let result = pipeline
                        .classify(question, &session_id, &CancellationToken::new())
                        .await;
                    println!("{}\n", summarize(&result));
                }
                ShellInput::Ask(question) => {
                    let _ = rl.add_history_entry(&line);
                    let answer = ask(&pipeline, question, &session_id).await;
                    println!("{answer}\n");
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Route one question; Ctrl+C while it runs cancels only this request.
async fn ask(pipeline: &IntentPipeline, question: &str, session_id: &SessionId) -> String {
    let cancel = CancellationToken::new();
    let request = pipeline.route_question_with_cancel(question, session_id, cancel.clone());
    tokio::pin!(request);

    tokio::select! {
        answer = &mut request => return answer,
        _ = tokio::signal::ctrl_c() => {}
    }
    cancel.cancel();
    request.await
}

fn summarize(result: &ClassificationResult) -> String {
    let mut lines = vec![format!(
        "{} {} ({:.2}, {})",
        "intent:".bold(),
        result.intent().to_string().cyan(),
        result.confidence(),
        result.source()
    )];
    if result.requires_calculation() || result.requires_filter() {
        lines.push(format!(
            "{} calculation={} filter={}",
            "flags:".bold(),
            result.requires_calculation(),
            result.requires_filter()
        ));
    }
    let criteria = result.filter_criteria();
    if !criteria.is_empty() {
        lines.push(format!("{} {criteria}", "filters:".bold()));
    }
    if !result.reason().is_empty() {
        lines.push(format!("{} {}", "reason:".bold(), result.reason().dimmed()));
    }
    if !result.success() {
        lines.push(format!("{} {}", "error:".red(), result.error_kind()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use twin_router::{ClassificationSource, ErrorKind, Intent, IntentDecision};

    #[test]
    fn quit_and_exit_end_the_session() {
        assert_eq!(parse_line("/quit"), ShellInput::Quit);
        assert_eq!(parse_line("  /exit "), ShellInput::Quit);
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse_line("   "), ShellInput::Skip);
    }

    #[test]
    fn classify_command_takes_the_rest_of_the_line() {
        assert_eq!(
            parse_line("/classify mis facturas de 2024"),
            ShellInput::Classify("mis facturas de 2024")
        );
        assert_eq!(parse_line("/classifyx"), ShellInput::Ask("/classifyx"));
    }

    #[test]
    fn anything_else_is_a_question() {
        assert_eq!(parse_line(" ¿Cuál es mi email? "), ShellInput::Ask("¿Cuál es mi email?"));
    }

    #[test]
    fn summary_mentions_intent_and_filters() {
        colored::control::set_override(false);
        let result = ClassificationResult::from_decision(
            IntentDecision {
                intent: Intent::InvoiceSearch,
                requires_filter: true,
                confidence: 0.9,
                reason: "invoice keywords".into(),
                ..IntentDecision::default()
            },
            "facturas de Endesa en 2023",
            &SessionId::from("s"),
            ClassificationSource::Model,
            ErrorKind::None,
            30,
        );
        let summary = summarize(&result);
        assert!(summary.contains("intent: InvoiceSearch (0.90, Model)"));
        assert!(summary.contains("filters: vendor=Endesa, year=2023"));
        assert!(summary.contains("reason: invoice keywords"));
    }
}

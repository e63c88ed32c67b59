// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification instructions sent to the language model.

use std::fmt::Write as _;

use crate::classification::{DocumentSubType, Intent, IntentDecision};
use crate::protocol::format_response;
use crate::taxonomy::PRECEDENCE;

const PREAMBLE: &str = r#"You classify questions that a user asks their personal digital assistant.
Questions may be in Spanish or English. Pick exactly one intent:"#;

const RULES: &str = r#"Rules:
- When several intents fit, prefer them in the order listed above; Generic is the last resort.
- SUBTYPE is one of Contracts, Licenses, Certificates, Legal, Other for DocumentSearch, otherwise NONE.
- REQUIRES_CALCULATION is YES when the answer needs a total, count, sum, average, maximum or minimum.
- REQUIRES_FILTER is YES when the question narrows results by vendor, person, date, period or amount.
- CONFIDENCE is a number between 0.0 and 1.0.
- REASON is one short sentence of at most {max_words} words.

Answer with exactly these six lines and nothing else:
INTENT: <intent>
SUBTYPE: <subtype>
REQUIRES_CALCULATION: <YES|NO>
REQUIRES_FILTER: <YES|NO>
CONFIDENCE: <number>
REASON: <text>"#;

/// Worked examples rendered after the rules.
fn worked_examples() -> [(&'static str, IntentDecision); 6] {
    let example = |intent, sub_type, requires_calculation, requires_filter, confidence, reason: &str| {
        IntentDecision {
            intent,
            sub_type,
            requires_calculation,
            requires_filter,
            confidence,
            reason: reason.to_string(),
        }
    };
    let na = DocumentSubType::NotApplicable;

    [
        (
            "¿Cuánto he gastado en Amazon este mes?",
            example(Intent::InvoiceSearch, na, true, true, 0.95, "spending total for a vendor and period"),
        ),
        (
            "Muéstrame mi contrato de alquiler",
            example(
                Intent::DocumentSearch,
                DocumentSubType::Contracts,
                false,
                false,
                0.9,
                "asks for a rental contract",
            ),
        ),
        (
            "¿Cuál es mi dirección?",
            example(Intent::ProfileSearch, na, false, false, 0.9, "the user's own address"),
        ),
        (
            "What is Ana García's email?",
            example(Intent::ContactSearch, na, false, true, 0.9, "email of a named contact"),
        ),
        (
            "Enséñame las fotos de la playa de 2023",
            example(Intent::PhotoSearch, na, false, true, 0.9, "photos filtered by place and year"),
        ),
        (
            "¿Qué tiempo hace hoy?",
            example(Intent::Generic, na, false, false, 0.8, "general question unrelated to personal data"),
        ),
    ]
}

/// Build the system instructions for the classification call.
pub fn build_instructions(reason_max_words: usize) -> String {
    let mut out = String::from(PREAMBLE);
    out.push('\n');

    for family in &PRECEDENCE {
        let vocabulary = family
            .strong
            .iter()
            .take(6)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "- {}: {} (e.g. {vocabulary})",
            family.intent, family.description
        );
    }
    let _ = writeln!(
        out,
        "- {}: anything else, including greetings and general knowledge",
        Intent::Generic
    );

    out.push('\n');
    out.push_str(&RULES.replace("{max_words}", &reason_max_words.to_string()));
    out.push_str("\n\nExamples:");

    for (question, decision) in worked_examples() {
        let _ = write!(out, "\n\nQuestion: {question}\n{}", format_response(&decision));
    }

    out
}

/// The user turn carrying the question.
pub fn question_message(question: &str) -> String {
    format!("Question: {}", question.trim())
}

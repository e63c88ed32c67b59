// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The six-key line protocol exchanged with the classification model.
//!
//! ```text
//! INTENT: InvoiceSearch
//! SUBTYPE: NONE
//! REQUIRES_CALCULATION: YES
//! REQUIRES_FILTER: YES
//! CONFIDENCE: 0.93
//! REASON: asks for a spending total with a vendor and a period
//! ```
//!
//! Parsing never fails. Keys are matched case-insensitively, list bullets and
//! markdown emphasis are ignored, unknown lines are skipped and unparseable
//! values leave the default in place. The first valid value for a key wins.

use std::fmt::Write as _;

use crate::classification::{DocumentSubType, Intent, IntentDecision, clamp_confidence};

type Setter = fn(&mut IntentDecision, &str) -> bool;

/// Protocol keys and how each one updates the decision.
const FIELDS: [(&str, Setter); 6] = [
    ("INTENT", set_intent),
    ("SUBTYPE", set_sub_type),
    ("REQUIRES_CALCULATION", set_requires_calculation),
    ("REQUIRES_FILTER", set_requires_filter),
    ("CONFIDENCE", set_confidence),
    ("REASON", set_reason),
];

/// Outcome of parsing one model answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub decision: IntentDecision,
    /// Number of distinct keys that carried a valid value.
    pub recognized_keys: usize,
}

impl ParsedResponse {
    /// True when nothing in the text could be decoded.
    pub fn is_all_default(&self) -> bool {
        self.recognized_keys == 0
    }
}

/// Decode a model answer into a decision.
pub fn parse_response(text: &str) -> ParsedResponse {
    let mut decision = IntentDecision::default();
    let mut seen = [false; FIELDS.len()];

    for line in text.lines() {
        let line = line
            .trim()
            .trim_start_matches(['-', '*', '#', '>', '•'])
            .trim_start();

        for (slot, (key, set)) in FIELDS.iter().enumerate() {
            if seen[slot] {
                continue;
            }
            if let Some(value) = value_for(line, key)
                && set(&mut decision, value)
            {
                seen[slot] = true;
                break;
            }
        }
    }

    ParsedResponse {
        decision,
        recognized_keys: seen.iter().filter(|s| **s).count(),
    }
}

/// Encode a decision in protocol form.
pub fn format_response(decision: &IntentDecision) -> String {
    let yes_no = |flag: bool| if flag { "YES" } else { "NO" };
    let sub_type = match decision.sub_type {
        DocumentSubType::NotApplicable => "NONE".to_string(),
        other => other.to_string(),
    };

    let mut out = String::new();
    let _ = writeln!(out, "INTENT: {}", decision.intent);
    let _ = writeln!(out, "SUBTYPE: {sub_type}");
    let _ = writeln!(out, "REQUIRES_CALCULATION: {}", yes_no(decision.requires_calculation));
    let _ = writeln!(out, "REQUIRES_FILTER: {}", yes_no(decision.requires_filter));
    let _ = writeln!(out, "CONFIDENCE: {:.2}", decision.confidence);
    let _ = write!(out, "REASON: {}", decision.reason);
    out
}

/// The value after `KEY:` when `line` starts with `key`, ignoring case and
/// markdown emphasis around the key.
fn value_for<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let head = line.get(..key.len())?;
    if !head.eq_ignore_ascii_case(key) {
        return None;
    }
    let rest = line[key.len()..].trim_start_matches('*').trim_start();
    let value = rest.strip_prefix(':')?;
    let value = value.trim().trim_matches(['*', '`', '"']).trim();
    (!value.is_empty()).then_some(value)
}

fn set_intent(decision: &mut IntentDecision, value: &str) -> bool {
    let intent = Intent::from_label(value).or_else(|| {
        value
            .split(|c: char| c.is_whitespace() || c == '(' || c == ',')
            .find(|token| !token.is_empty())
            .and_then(Intent::from_label)
    });
    intent.map(|intent| decision.intent = intent).is_some()
}

fn set_sub_type(decision: &mut IntentDecision, value: &str) -> bool {
    DocumentSubType::from_label(value)
        .map(|sub| decision.sub_type = sub)
        .is_some()
}

fn set_requires_calculation(decision: &mut IntentDecision, value: &str) -> bool {
    parse_flag(value)
        .map(|flag| decision.requires_calculation = flag)
        .is_some()
}

fn set_requires_filter(decision: &mut IntentDecision, value: &str) -> bool {
    parse_flag(value)
        .map(|flag| decision.requires_filter = flag)
        .is_some()
}

fn set_confidence(decision: &mut IntentDecision, value: &str) -> bool {
    parse_confidence(value)
        .map(|confidence| decision.confidence = confidence)
        .is_some()
}

fn set_reason(decision: &mut IntentDecision, value: &str) -> bool {
    decision.reason = value.to_string();
    true
}

fn parse_flag(value: &str) -> Option<bool> {
    let word = value
        .split(|c: char| !c.is_alphabetic())
        .find(|w| !w.is_empty())?
        .to_lowercase();
    match word.as_str() {
        "yes" | "true" | "si" | "sí" | "y" => Some(true),
        "no" | "false" | "n" => Some(false),
        _ => None,
    }
}

/// A decimal in `[0, 1]` or a percentage such as `85%`. Out-of-range values
/// are clamped; non-finite ones are rejected.
fn parse_confidence(value: &str) -> Option<f32> {
    let token = value.split_whitespace().next()?;
    let (number, scale) = match token.strip_suffix('%') {
        Some(number) => (number, 100.0),
        None => (token, 1.0),
    };
    let parsed: f32 = number.replace(',', ".").parse().ok()?;
    parsed
        .is_finite()
        .then(|| clamp_confidence(parsed / scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_complete_answer() {
        let text = "INTENT: InvoiceSearch\nSUBTYPE: NONE\nREQUIRES_CALCULATION: YES\n\
                    REQUIRES_FILTER: YES\nCONFIDENCE: 0.93\nREASON: spending total by vendor";
        let parsed = parse_response(text);
        assert_eq!(parsed.recognized_keys, 6);
        assert_eq!(parsed.decision.intent, Intent::InvoiceSearch);
        assert!(parsed.decision.requires_calculation);
        assert!(parsed.decision.requires_filter);
        assert_eq!(parsed.decision.confidence, 0.93);
        assert_eq!(parsed.decision.reason, "spending total by vendor");
    }

    #[test]
    fn intent_only_uses_defaults_for_the_rest() {
        let parsed = parse_response("INTENT: PhotoSearch");
        assert_eq!(parsed.recognized_keys, 1);
        assert_eq!(parsed.decision.intent, Intent::PhotoSearch);
        assert_eq!(parsed.decision.sub_type, DocumentSubType::NotApplicable);
        assert!(!parsed.decision.requires_calculation);
        assert!(!parsed.decision.requires_filter);
        assert_eq!(parsed.decision.confidence, 0.0);
        assert_eq!(parsed.decision.reason, "");
    }

    #[test]
    fn tolerates_markdown_bullets_and_case() {
        let text = "Here you go:\n- **Intent:** document_search\n* subtype: Contracts\n\
                    - **Confidence**: 85%\n";
        let parsed = parse_response(text);
        assert_eq!(parsed.decision.intent, Intent::DocumentSearch);
        assert_eq!(parsed.decision.sub_type, DocumentSubType::Contracts);
        assert_eq!(parsed.decision.confidence, 0.85);
        assert_eq!(parsed.recognized_keys, 3);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let text = "INTENT: WeatherSearch\nCONFIDENCE: high\nREQUIRES_FILTER: maybe";
        let parsed = parse_response(text);
        assert!(parsed.is_all_default());
        assert_eq!(parsed.decision, IntentDecision::default());
    }

    #[test]
    fn first_valid_value_wins() {
        let text = "INTENT: bogus\nINTENT: ContactSearch\nINTENT: Generic";
        assert_eq!(parse_response(text).decision.intent, Intent::ContactSearch);
    }

    #[test]
    fn intent_value_with_trailing_commentary() {
        let parsed = parse_response("INTENT: ProfileSearch (user asks about own email)");
        assert_eq!(parsed.decision.intent, Intent::ProfileSearch);
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(parse_response("CONFIDENCE: 1.4").decision.confidence, 1.0);
        assert_eq!(parse_response("CONFIDENCE: -3").decision.confidence, 0.0);
        assert!(parse_response("CONFIDENCE: NaN").is_all_default());
    }

    #[test]
    fn spanish_flags() {
        let parsed = parse_response("REQUIRES_CALCULATION: Sí\nREQUIRES_FILTER: no");
        assert!(parsed.decision.requires_calculation);
        assert!(!parsed.decision.requires_filter);
    }

    #[test]
    fn empty_and_prose_inputs_are_all_default() {
        assert!(parse_response("").is_all_default());
        assert!(parse_response("I think this is about invoices.").is_all_default());
    }

    #[test]
    fn formatted_decision_parses_back() {
        let decision = IntentDecision {
            intent: Intent::DocumentSearch,
            sub_type: DocumentSubType::Licenses,
            requires_calculation: false,
            requires_filter: true,
            confidence: 0.75,
            reason: "driving license lookup".to_string(),
        };
        let parsed = parse_response(&format_response(&decision));
        assert_eq!(parsed.recognized_keys, 6);
        assert_eq!(parsed.decision, decision);
    }
}

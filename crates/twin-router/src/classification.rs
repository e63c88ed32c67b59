// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent taxonomy types and the normalized classification result.
//!
//! [`ClassificationResult`] can only be built through its constructors, which
//! enforce the validity rules: a failed classification is always `Generic`
//! with zero confidence, the document sub-type is `NotApplicable` outside
//! `DocumentSearch`, and confidence is clamped into `[0, 1]`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};
use twin_core::{SessionId, TwinError};

use crate::filter::FilterCriteria;

/// The closed set of purposes a user question can have.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize,
)]
pub enum Intent {
    #[default]
    Generic,
    InvoiceSearch,
    DocumentSearch,
    ProfileSearch,
    ContactSearch,
    PhotoSearch,
}

impl Intent {
    /// Number of intents; sizes the dispatch table.
    pub const COUNT: usize = 6;

    /// Every intent, in declaration order (`Intent::ALL[i].index() == i`).
    pub const ALL: [Intent; Intent::COUNT] = [
        Intent::Generic,
        Intent::InvoiceSearch,
        Intent::DocumentSearch,
        Intent::ProfileSearch,
        Intent::ContactSearch,
        Intent::PhotoSearch,
    ];

    /// Position of this intent in [`Intent::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parse an intent name leniently: case, spaces, `_` and `-` are ignored,
    /// so `InvoiceSearch`, `invoice_search` and `Invoice Search` all match.
    pub fn from_label(label: &str) -> Option<Intent> {
        let wanted = squash(label);
        if wanted.is_empty() {
            return None;
        }
        Intent::ALL
            .into_iter()
            .find(|intent| squash(&intent.to_string()) == wanted)
    }
}

/// Kind of formal document, meaningful only for [`Intent::DocumentSearch`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize,
)]
pub enum DocumentSubType {
    Contracts,
    Licenses,
    Certificates,
    Legal,
    Other,
    #[default]
    NotApplicable,
}

impl DocumentSubType {
    const ALL: [DocumentSubType; 6] = [
        DocumentSubType::Contracts,
        DocumentSubType::Licenses,
        DocumentSubType::Certificates,
        DocumentSubType::Legal,
        DocumentSubType::Other,
        DocumentSubType::NotApplicable,
    ];

    /// Parse a sub-type leniently. `NONE`, `N/A` and singular forms are accepted.
    pub fn from_label(label: &str) -> Option<DocumentSubType> {
        let wanted = squash(label);
        match wanted.as_str() {
            "" => None,
            "none" | "na" | "null" => Some(DocumentSubType::NotApplicable),
            "contract" => Some(DocumentSubType::Contracts),
            "license" | "licence" | "licences" => Some(DocumentSubType::Licenses),
            "certificate" => Some(DocumentSubType::Certificates),
            _ => DocumentSubType::ALL
                .into_iter()
                .find(|sub| squash(&sub.to_string()) == wanted),
        }
    }
}

/// Why a classification could not be fully trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize)]
pub enum ErrorKind {
    #[default]
    None,
    /// The backend refused the question; the keyword fallback answered instead.
    ContentPolicyBlocked,
    /// The model answered but no protocol key could be decoded.
    ParseError,
    /// Any other backend or network failure.
    TransportError,
}

impl From<&TwinError> for ErrorKind {
    fn from(err: &TwinError) -> Self {
        match err {
            TwinError::ContentPolicy { .. } => ErrorKind::ContentPolicyBlocked,
            _ => ErrorKind::TransportError,
        }
    }
}

/// Which path produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum ClassificationSource {
    /// Decoded from the language-model answer.
    Model,
    /// Produced by the keyword fallback classifier.
    Fallback,
    /// No classification was attempted or it failed outright.
    Unclassified,
}

/// The decision part of a classification, shared by the protocol parser and
/// the fallback classifier before it is wrapped into a [`ClassificationResult`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntentDecision {
    pub intent: Intent,
    pub sub_type: DocumentSubType,
    pub requires_calculation: bool,
    pub requires_filter: bool,
    pub confidence: f32,
    pub reason: String,
}

/// The normalized output of classifying one question.
///
/// Created once per question, consumed by the router, then discarded.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    intent: Intent,
    sub_type: DocumentSubType,
    requires_calculation: bool,
    requires_filter: bool,
    confidence: f32,
    reason: String,
    original_question: String,
    session_id: SessionId,
    processed_at: DateTime<Utc>,
    success: bool,
    error_kind: ErrorKind,
    source: ClassificationSource,
}

impl ClassificationResult {
    /// Wrap a successful decision, normalizing it.
    pub fn from_decision(
        decision: IntentDecision,
        question: &str,
        session_id: &SessionId,
        source: ClassificationSource,
        error_kind: ErrorKind,
        reason_max_words: usize,
    ) -> Self {
        let sub_type = if decision.intent == Intent::DocumentSearch {
            decision.sub_type
        } else {
            DocumentSubType::NotApplicable
        };

        Self {
            intent: decision.intent,
            sub_type,
            requires_calculation: decision.requires_calculation,
            requires_filter: decision.requires_filter,
            confidence: clamp_confidence(decision.confidence),
            reason: bound_words(&decision.reason, reason_max_words),
            original_question: question.to_string(),
            session_id: session_id.clone(),
            processed_at: Utc::now(),
            success: true,
            error_kind,
            source,
        }
    }

    /// A classification that could not be trusted: `Generic`, zero confidence.
    pub fn failed(
        question: &str,
        session_id: &SessionId,
        error_kind: ErrorKind,
        reason: &str,
        reason_max_words: usize,
    ) -> Self {
        Self {
            intent: Intent::Generic,
            sub_type: DocumentSubType::NotApplicable,
            requires_calculation: false,
            requires_filter: false,
            confidence: 0.0,
            reason: bound_words(reason, reason_max_words),
            original_question: question.to_string(),
            session_id: session_id.clone(),
            processed_at: Utc::now(),
            success: false,
            error_kind,
            source: ClassificationSource::Unclassified,
        }
    }

    /// A `Generic` result for input that was not worth classifying.
    pub fn unclassified(question: &str, session_id: &SessionId, reason: &str) -> Self {
        Self::from_decision(
            IntentDecision {
                reason: reason.to_string(),
                ..IntentDecision::default()
            },
            question,
            session_id,
            ClassificationSource::Unclassified,
            ErrorKind::None,
            usize::MAX,
        )
    }

    /// A new result routed to `Generic`, keeping everything else but the
    /// intent-specific fields. Used by the low-confidence routing policy.
    /// The new reason is bounded to `reason_max_words` like any other.
    pub fn rerouted_to_generic(&self, reason: &str, reason_max_words: usize) -> Self {
        Self {
            intent: Intent::Generic,
            sub_type: DocumentSubType::NotApplicable,
            requires_calculation: false,
            requires_filter: false,
            reason: bound_words(reason, reason_max_words),
            ..self.clone()
        }
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn sub_type(&self) -> DocumentSubType {
        self.sub_type
    }

    pub fn requires_calculation(&self) -> bool {
        self.requires_calculation
    }

    pub fn requires_filter(&self) -> bool {
        self.requires_filter
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn original_question(&self) -> &str {
        &self.original_question
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error_kind(&self) -> ErrorKind {
        self.error_kind
    }

    pub fn source(&self) -> ClassificationSource {
        self.source
    }

    /// The decision fields of this result, without request metadata.
    pub fn decision(&self) -> IntentDecision {
        IntentDecision {
            intent: self.intent,
            sub_type: self.sub_type,
            requires_calculation: self.requires_calculation,
            requires_filter: self.requires_filter,
            confidence: self.confidence,
            reason: self.reason.clone(),
        }
    }

    /// Best-effort filters (vendor, period, amount) extracted from the question.
    ///
    /// Computed on demand; only calculation-capable handlers need it.
    pub fn filter_criteria(&self) -> FilterCriteria {
        FilterCriteria::extract(&self.original_question)
    }
}

/// Clamp into `[0, 1]`; NaN becomes 0.
pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Keep at most `max_words` whitespace-separated words.
pub fn bound_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase alphanumerics only, for lenient label matching.
fn squash(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid() -> SessionId {
        SessionId::from("twin-1")
    }

    #[test]
    fn intent_index_matches_all_order() {
        for (i, intent) in Intent::ALL.iter().enumerate() {
            assert_eq!(intent.index(), i);
        }
    }

    #[test]
    fn intent_labels_are_lenient() {
        assert_eq!(Intent::from_label("InvoiceSearch"), Some(Intent::InvoiceSearch));
        assert_eq!(Intent::from_label("invoice_search"), Some(Intent::InvoiceSearch));
        assert_eq!(Intent::from_label(" Photo Search "), Some(Intent::PhotoSearch));
        assert_eq!(Intent::from_label("CONTACT-SEARCH"), Some(Intent::ContactSearch));
        assert_eq!(Intent::from_label("weather"), None);
        assert_eq!(Intent::from_label(""), None);
    }

    #[test]
    fn sub_type_labels_are_lenient() {
        assert_eq!(DocumentSubType::from_label("NONE"), Some(DocumentSubType::NotApplicable));
        assert_eq!(DocumentSubType::from_label("N/A"), Some(DocumentSubType::NotApplicable));
        assert_eq!(DocumentSubType::from_label("contract"), Some(DocumentSubType::Contracts));
        assert_eq!(DocumentSubType::from_label("Legal"), Some(DocumentSubType::Legal));
        assert_eq!(DocumentSubType::from_label("passport"), None);
    }

    #[test]
    fn error_kind_from_twin_error_is_a_variant_match() {
        let blocked = TwinError::ContentPolicy {
            message: "filtered".into(),
        };
        let transport = TwinError::Provider {
            message: "content_filter".into(),
            source: None,
        };
        let timeout = TwinError::Timeout {
            duration: std::time::Duration::from_secs(1),
        };
        assert_eq!(ErrorKind::from(&blocked), ErrorKind::ContentPolicyBlocked);
        assert_eq!(ErrorKind::from(&transport), ErrorKind::TransportError);
        assert_eq!(ErrorKind::from(&timeout), ErrorKind::TransportError);
    }

    #[test]
    fn failed_result_is_generic_with_zero_confidence() {
        let result = ClassificationResult::failed(
            "¿Cuánto gasté?",
            &sid(),
            ErrorKind::TransportError,
            "connection refused",
            30,
        );
        assert!(!result.success());
        assert_eq!(result.intent(), Intent::Generic);
        assert_eq!(result.confidence(), 0.0);
        assert_eq!(result.sub_type(), DocumentSubType::NotApplicable);
        assert_eq!(result.source(), ClassificationSource::Unclassified);
    }

    #[test]
    fn sub_type_is_dropped_outside_document_search() {
        let decision = IntentDecision {
            intent: Intent::InvoiceSearch,
            sub_type: DocumentSubType::Contracts,
            confidence: 0.9,
            ..IntentDecision::default()
        };
        let result = ClassificationResult::from_decision(
            decision,
            "q",
            &sid(),
            ClassificationSource::Model,
            ErrorKind::None,
            30,
        );
        assert_eq!(result.sub_type(), DocumentSubType::NotApplicable);

        let decision = IntentDecision {
            intent: Intent::DocumentSearch,
            sub_type: DocumentSubType::Licenses,
            ..IntentDecision::default()
        };
        let result = ClassificationResult::from_decision(
            decision,
            "q",
            &sid(),
            ClassificationSource::Model,
            ErrorKind::None,
            30,
        );
        assert_eq!(result.sub_type(), DocumentSubType::Licenses);
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(clamp_confidence(1.7), 1.0);
        assert_eq!(clamp_confidence(-0.2), 0.0);
        assert_eq!(clamp_confidence(f32::NAN), 0.0);
        assert_eq!(clamp_confidence(0.42), 0.42);
    }

    #[test]
    fn reason_is_bounded_in_words() {
        let long = "word ".repeat(50);
        let decision = IntentDecision {
            reason: long,
            ..IntentDecision::default()
        };
        let result = ClassificationResult::from_decision(
            decision,
            "q",
            &sid(),
            ClassificationSource::Model,
            ErrorKind::None,
            30,
        );
        assert_eq!(result.reason().split_whitespace().count(), 30);
    }

    #[test]
    fn rerouting_keeps_metadata() {
        let decision = IntentDecision {
            intent: Intent::PhotoSearch,
            confidence: 0.2,
            requires_filter: true,
            ..IntentDecision::default()
        };
        let result = ClassificationResult::from_decision(
            decision,
            "fotos",
            &sid(),
            ClassificationSource::Model,
            ErrorKind::None,
            30,
        );
        let rerouted = result.rerouted_to_generic("low confidence", 30);
        assert_eq!(rerouted.intent(), Intent::Generic);
        assert!(!rerouted.requires_filter());
        assert_eq!(rerouted.confidence(), 0.2);
        assert_eq!(rerouted.original_question(), "fotos");
        assert_eq!(rerouted.session_id(), &sid());
    }

    #[test]
    fn rerouted_reason_respects_the_word_limit() {
        let result = ClassificationResult::from_decision(
            IntentDecision {
                intent: Intent::InvoiceSearch,
                confidence: 0.3,
                ..IntentDecision::default()
            },
            "facturas",
            &sid(),
            ClassificationSource::Model,
            ErrorKind::None,
            3,
        );
        let rerouted =
            result.rerouted_to_generic("InvoiceSearch classified with confidence 0.30 below 0.50", 3);
        assert_eq!(rerouted.reason(), "InvoiceSearch classified with");
    }
}

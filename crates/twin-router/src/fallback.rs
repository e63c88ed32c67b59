// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic keyword classifier used when the model refuses a question.
//!
//! Zero-cost and pure: the same question always yields the same decision.
//! Confidences come from [`FallbackConfig`], calibrated so a strong keyword
//! hit ranks above a weak one and both rank above the generic default.

use twin_config::model::FallbackConfig;

use crate::classification::{Intent, IntentDecision};
use crate::filter::FilterCriteria;
use crate::taxonomy::{TermStrength, document_sub_type, first_match, match_families, normalize};

const CALCULATION_TERMS: &[&str] = &[
    "total", "totales", "cuanto", "cuanta", "cuantos", "cuantas", "how much", "how many", "suma",
    "sum", "promedio", "average", "calcula", "calcular", "calculate", "maximo", "maxima",
    "minimo", "minima", "mas caro", "mas cara", "most expensive",
];

const INVOICE_FILTER_TERMS: &[&str] = &[
    "proveedor", "proveedores", "vendor", "mes", "month", "ano", "year", "trimestre", "quarter",
    "desde", "since", "entre", "between", "ultimo", "ultima", "ultimos", "ultimas", "last",
];

const CONTACT_GROUP_TERMS: &[&str] = &[
    "familia", "family", "trabajo", "work", "empresa", "company", "amigo", "amiga", "amigos",
    "amigas", "friend", "friends", "colleague", "colleagues", "companero", "companera",
    "companeros", "companeras",
];

const DOCUMENT_STATE_TERMS: &[&str] = &[
    "vencido", "vencida", "vencidos", "vencidas", "caducado", "caducada", "caducados",
    "caducadas", "caduca", "expired", "expira", "expire", "expires", "vigente", "vigentes",
    "valid",
];

const PHOTO_EVENT_TERMS: &[&str] = &[
    "viaje", "viajes", "trip", "trips", "vacaciones", "vacation", "vacations", "cumpleanos",
    "birthday", "navidad", "christmas", "boda", "bodas", "wedding",
];

/// Keyword fallback classifier.
#[derive(Debug, Clone)]
pub struct FallbackClassifier {
    config: FallbackConfig,
}

impl FallbackClassifier {
    pub fn new(config: FallbackConfig) -> Self {
        Self { config }
    }

    /// Classify by keyword precedence: invoice, document, profile, contact,
    /// photo, else generic.
    pub fn classify(&self, question: &str) -> IntentDecision {
        let Some(hit) = match_families(question) else {
            return IntentDecision {
                confidence: self.config.generic_confidence,
                reason: "keyword fallback: no intent vocabulary found".to_string(),
                ..IntentDecision::default()
            };
        };

        let normalized = normalize(question);
        let criteria = FilterCriteria::extract(question);
        let mut decision = IntentDecision {
            intent: hit.intent,
            confidence: match hit.strength {
                TermStrength::Strong => self.strong_confidence(hit.intent),
                TermStrength::Weak => self.config.keyword_confidence,
            },
            reason: format!(
                "keyword fallback: matched '{}' ({:?} {} vocabulary)",
                hit.term, hit.strength, hit.intent
            ),
            ..IntentDecision::default()
        };

        match hit.intent {
            Intent::InvoiceSearch => {
                decision.requires_calculation = first_match(&normalized, CALCULATION_TERMS).is_some();
                decision.requires_filter =
                    !criteria.is_empty() || first_match(&normalized, INVOICE_FILTER_TERMS).is_some();
            }
            Intent::DocumentSearch => {
                decision.sub_type = document_sub_type(&normalized);
                decision.requires_calculation =
                    first_match(&normalized, &["cuantos", "cuantas", "how many"]).is_some();
                decision.requires_filter = criteria.has_period()
                    || first_match(&normalized, DOCUMENT_STATE_TERMS).is_some();
            }
            Intent::ContactSearch => {
                decision.requires_filter = first_match(&normalized, CONTACT_GROUP_TERMS).is_some();
            }
            Intent::PhotoSearch => {
                decision.requires_filter = criteria.has_period()
                    || first_match(&normalized, PHOTO_EVENT_TERMS).is_some();
            }
            Intent::ProfileSearch | Intent::Generic => {}
        }

        decision
    }

    fn strong_confidence(&self, intent: Intent) -> f32 {
        match intent {
            Intent::InvoiceSearch => self.config.invoice_confidence,
            Intent::DocumentSearch => self.config.document_confidence,
            Intent::ProfileSearch => self.config.profile_confidence,
            Intent::ContactSearch => self.config.contact_confidence,
            Intent::PhotoSearch => self.config.photo_confidence,
            Intent::Generic => self.config.generic_confidence,
        }
    }
}

impl Default for FallbackClassifier {
    fn default() -> Self {
        Self::new(FallbackConfig::default())
    }
}

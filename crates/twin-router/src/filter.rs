// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort extraction of search filters from a question.
//!
//! Recognizes a named entity after a preposition ("en Microsoft"), absolute and
//! relative years, month names, quarters and amount comparisons, in Spanish
//! and English. Anything not recognized is simply absent.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;

use crate::taxonomy::{contains_term, normalize};

pub const VENDOR: &str = "vendor";
pub const YEAR: &str = "year";
pub const MONTH: &str = "month";
pub const QUARTER: &str = "quarter";
pub const AMOUNT_OPERATOR: &str = "amount_operator";
pub const AMOUNT: &str = "amount";

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre|january|february|march|april|june|july|august|september|october|november|december)\b",
    )
    .unwrap()
});

static QUARTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:q([1-4])|(primer|segundo|tercer|cuarto) trimestre|(first|second|third|fourth) quarter)\b",
    )
    .unwrap()
});

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(mas de|mas que|mayor(?:es)? (?:a|de|que)|superior(?:es)? a|more than|over|above|greater than)|(menos de|menos que|menor(?:es)? (?:a|de|que)|inferior(?:es)? a|less than|under|below)|(exactamente|exactly))\s*[$€]?\s*(\d+(?:[.,]\d+)?)",
    )
    .unwrap()
});

// Runs on the raw question: capitalization marks the entity.
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:en|de|del|a|con|por|from|at|with|to|by)\s+(\p{Lu}[\p{L}\p{N}&.\-]*(?:\s+\p{Lu}[\p{L}\p{N}&.\-]*)*)",
    )
    .unwrap()
});

/// Optional filters derived from the question text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterCriteria(BTreeMap<String, String>);

impl FilterCriteria {
    /// Extract filters, resolving relative periods against today's UTC date.
    pub fn extract(question: &str) -> Self {
        Self::extract_at(question, Utc::now().date_naive())
    }

    /// Extract filters, resolving "this year" and similar against `today`.
    pub fn extract_at(question: &str, today: NaiveDate) -> Self {
        let mut criteria = Self::default();
        let normalized = normalize(question);

        let amount_span = AMOUNT_RE.captures(&normalized).map(|caps| {
            let operator = if caps.get(1).is_some() {
                ">"
            } else if caps.get(2).is_some() {
                "<"
            } else {
                "="
            };
            criteria.insert(AMOUNT_OPERATOR, operator);
            if let Some(amount) = caps.get(4) {
                criteria.insert(AMOUNT, &amount.as_str().replace(',', "."));
            }
            caps.get(0).map_or(0..0, |m| m.range())
        });

        let explicit_year = YEAR_RE
            .find_iter(&normalized)
            .find(|m| amount_span.as_ref().is_none_or(|span| !span.contains(&m.start())));
        if let Some(year) = explicit_year {
            criteria.insert(YEAR, year.as_str());
        } else if ["este ano", "this year", "ano actual", "en lo que va de ano"]
            .iter()
            .any(|t| contains_term(&normalized, t))
        {
            criteria.insert(YEAR, &today.year().to_string());
        } else if ["ano pasado", "last year"]
            .iter()
            .any(|t| contains_term(&normalized, t))
        {
            criteria.insert(YEAR, &(today.year() - 1).to_string());
        }

        if let Some(month) = MONTH_RE
            .captures(&normalized)
            .and_then(|caps| caps.get(1))
            .and_then(|m| month_number(m.as_str()))
        {
            criteria.insert(MONTH, &format!("{month:02}"));
        } else if ["este mes", "this month"]
            .iter()
            .any(|t| contains_term(&normalized, t))
        {
            criteria.insert(MONTH, &format!("{:02}", today.month()));
            criteria.insert_missing(YEAR, &today.year().to_string());
        } else if ["mes pasado", "last month"]
            .iter()
            .any(|t| contains_term(&normalized, t))
        {
            let (year, month) = match today.month() {
                1 => (today.year() - 1, 12),
                m => (today.year(), m - 1),
            };
            criteria.insert(MONTH, &format!("{month:02}"));
            criteria.insert_missing(YEAR, &year.to_string());
        }

        if let Some(caps) = QUARTER_RE.captures(&normalized) {
            let quarter = caps
                .get(1)
                .map(|m| m.as_str())
                .or_else(|| caps.get(2).or(caps.get(3)).map(|m| ordinal(m.as_str())));
            if let Some(q) = quarter {
                criteria.insert(QUARTER, &format!("Q{q}"));
            }
        }

        if let Some(entity) = ENTITY_RE
            .captures_iter(question)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end_matches(['.', '-']))
            .find(|candidate| is_entity(candidate))
        {
            criteria.insert(VENDOR, entity);
        }

        criteria
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when a year, month or quarter was recognized.
    pub fn has_period(&self) -> bool {
        [YEAR, MONTH, QUARTER].iter().any(|k| self.0.contains_key(*k))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    fn insert_missing(&mut self, key: &str, value: &str) {
        self.0
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "enero" | "january" => 1,
        "febrero" | "february" => 2,
        "marzo" | "march" => 3,
        "abril" | "april" => 4,
        "mayo" => 5,
        "junio" | "june" => 6,
        "julio" | "july" => 7,
        "agosto" | "august" => 8,
        "septiembre" | "setiembre" | "september" => 9,
        "octubre" | "october" => 10,
        "noviembre" | "november" => 11,
        "diciembre" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

fn ordinal(word: &str) -> &'static str {
    match word {
        "primer" | "first" => "1",
        "segundo" | "second" => "2",
        "tercer" | "third" => "3",
        _ => "4",
    }
}

/// Reject capitalized words that are periods or filler rather than names.
fn is_entity(candidate: &str) -> bool {
    const NOT_NAMES: &[&str] = &["q1", "q2", "q3", "q4", "navidad", "christmas", "i"];
    let lowered = normalize(candidate);
    !candidate.is_empty()
        && month_number(&lowered).is_none()
        && !NOT_NAMES.contains(&lowered.as_str())
}

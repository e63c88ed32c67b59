// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classification and request routing for the Twin backend.
//!
//! This crate provides:
//! - [`IntentClassifier`]: language-model classification with a deterministic
//!   keyword fallback when the backend refuses a question
//! - [`Dispatcher`]: a total intent to handler table with timeout, panic and
//!   cancellation containment
//! - [`IntentPipeline`]: the `route_question` entry point combining both
//!
//! Every question is classified into one [`Intent`] and answered by exactly
//! one [`IntentHandler`]. Callers always receive text, never an error.

pub mod classification;
pub mod classifier;
pub mod dispatcher;
pub mod fallback;
pub mod filter;
pub mod handler;
pub mod pipeline;
pub mod primary;
pub mod prompt;
pub mod protocol;
pub mod taxonomy;

pub use classification::{
    ClassificationResult, ClassificationSource, DocumentSubType, ErrorKind, Intent, IntentDecision,
};
pub use classifier::IntentClassifier;
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use fallback::FallbackClassifier;
pub use filter::FilterCriteria;
pub use handler::IntentHandler;
pub use pipeline::IntentPipeline;
pub use primary::PrimaryClassifier;
pub use protocol::{ParsedResponse, format_response, parse_response};

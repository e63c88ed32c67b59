// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The seam between routing and intent-specific answering.

use async_trait::async_trait;
use twin_core::{SessionId, TwinError};

use crate::classification::ClassificationResult;

/// Answers questions of one intent.
///
/// Handlers are shared across concurrent requests and must not assume
/// exclusive access to anything.
#[async_trait]
pub trait IntentHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Produce the answer text for `question`.
    async fn handle(
        &self,
        question: &str,
        session_id: &SessionId,
        classification: &ClassificationResult,
    ) -> Result<String, TwinError>;
}

// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Twin integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockBackend`] - Mock completion backend with scripted replies
//! - [`RecordingHandler`] - Intent handler that records what it was routed
//! - [`TestHarness`] - A full pipeline wired to both

pub mod harness;
pub mod mock_backend;
pub mod mock_handler;

pub use harness::{TestHarness, new_session_id};
pub use mock_backend::{MockBackend, MockReply};
pub use mock_handler::{FailingHandler, HandledCall, PanickingHandler, RecordingHandler, SlowHandler};

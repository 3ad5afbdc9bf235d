// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it at its documented level with structured fields.
//!
//! # Organization
//!
//! * `chain` - chain construction, pruning and graph validation
//! * `engine` - wave executor lifecycle and execution events
//! * `step` - step execution events
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_buildchain::observability::messages::engine::ExecutionStarted;
//!
//! let msg = ExecutionStarted {
//!     strategy: "waves",
//!     step_count: 12,
//!     wave_count: 4,
//!     max_concurrency: 8,
//! };
//!
//! tracing::info!("{}", msg);
//! ```

use tracing::Span;

pub mod chain;
pub mod engine;
pub mod step;

/// Emit a message as a structured tracing event, or open a span carrying its fields.
pub trait StructuredLog {
    /// Emit the event at the message's level.
    fn log(&self);

    /// Create a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging in the build chain engine. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Keep log wording in one place instead of scattered format strings
//! * Attach the same structured fields every time an event is emitted
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::chain` - chain construction, pruning and graph validation
//! * `messages::engine` - wave executor lifecycle
//! * `messages::step` - individual step execution
//!
//! # Usage
//!
//! ```rust
//! use the_buildchain::observability::messages::{step::StepFailed, StructuredLog};
//!
//! let msg = StepFailed {
//!     step_id: "jar-assembly",
//!     error: "disk full",
//! };
//!
//! msg.log();
//! ```

pub mod messages;

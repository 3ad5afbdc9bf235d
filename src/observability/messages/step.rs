// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for step execution events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Step action started.
///
/// # Log Level
/// `debug!` - One per kept step
pub struct StepStarted<'a> {
    pub step_id: &'a str,
    pub wave: usize,
    pub input_items: usize,
}

impl Display for StepStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Step '{}' started in wave {} with {} consumed item(s)",
            self.step_id, self.wave, self.input_items
        )
    }
}

impl StructuredLog for StepStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            step_id = self.step_id,
            wave = self.wave,
            input_items = self.input_items,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "step",
            span_name = name,
            step_id = self.step_id,
            wave = self.wave,
        )
    }
}

/// Step action returned its outputs.
///
/// # Log Level
/// `debug!` - One per kept step
///
/// # Example
/// ```
/// use the_buildchain::observability::messages::step::StepCompleted;
/// use std::time::Duration;
///
/// let msg = StepCompleted {
///     step_id: "scan-classes",
///     produced: 3,
///     duration: Duration::from_millis(12),
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct StepCompleted<'a> {
    pub step_id: &'a str,
    pub produced: usize,
    pub duration: Duration,
}

impl Display for StepCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Step '{}' completed: produced {} value(s) in {:?}",
            self.step_id, self.produced, self.duration
        )
    }
}

impl StructuredLog for StepCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            step_id = self.step_id,
            produced = self.produced,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("step_completed", span_name = name, step_id = self.step_id)
    }
}

/// Step action failed, panicked or produced invalid output.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct StepFailed<'a> {
    pub step_id: &'a str,
    pub error: &'a str,
}

impl Display for StepFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Step '{}' failed: {}", self.step_id, self.error)
    }
}

impl StructuredLog for StepFailed<'_> {
    fn log(&self) {
        tracing::error!(step_id = self.step_id, error = self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "step_failed",
            span_name = name,
            step_id = self.step_id,
            error = self.error,
        )
    }
}

/// An overridable producer's value was dropped because a regular producer supplies the item.
///
/// # Log Level
/// `debug!` - Expected when an overridable default is replaced
pub struct OverriddenValueDiscarded<'a> {
    pub step_id: &'a str,
    pub item: &'a str,
}

impl Display for OverriddenValueDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Discarded overridden value of '{}' produced by step '{}'",
            self.item, self.step_id
        )
    }
}

impl StructuredLog for OverriddenValueDiscarded<'_> {
    fn log(&self) {
        tracing::debug!(step_id = self.step_id, item = self.item, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "overridden_value",
            span_name = name,
            step_id = self.step_id,
            item = self.item,
        )
    }
}

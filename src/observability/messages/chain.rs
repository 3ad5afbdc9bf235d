// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for chain construction and graph validation.
//!
//! This module contains message types for logging events related to:
//! * Step registration and declaration errors
//! * Pruning of unreachable steps
//! * Unsatisfied dependency and cycle detection
//! * Graph output

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A step was registered with a chain builder.
///
/// # Log Level
/// `debug!` - Registration happens once per step and is high volume
pub struct StepRegistered<'a> {
    pub step_id: &'a str,
    pub produces: usize,
    pub consumes: usize,
}

impl Display for StepRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered step '{}': produces {} item(s), consumes {} item(s)",
            self.step_id, self.produces, self.consumes
        )
    }
}

impl StructuredLog for StepRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            step_id = self.step_id,
            produces = self.produces,
            consumes = self.consumes,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "step_registered",
            span_name = name,
            step_id = self.step_id,
        )
    }
}

/// A step declaration was rejected.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DeclarationRejected<'a> {
    pub step_id: &'a str,
    pub reason: &'a dyn std::error::Error,
}

impl Display for DeclarationRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Rejected step '{}': {}", self.step_id, self.reason)
    }
}

impl StructuredLog for DeclarationRejected<'_> {
    fn log(&self) {
        tracing::error!(
            step_id = self.step_id,
            reason = %self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "declaration_rejected",
            span_name = name,
            step_id = self.step_id,
        )
    }
}

/// A step was dropped because nothing requested depends on it.
///
/// # Log Level
/// `debug!` - Most registered steps are pruned in a typical build
///
/// # Example
/// ```
/// use the_buildchain::observability::messages::chain::StepPruned;
///
/// let msg = StepPruned { step_id: "native-image" };
/// assert_eq!(msg.to_string(), "Pruned unreachable step 'native-image'");
/// ```
pub struct StepPruned<'a> {
    pub step_id: &'a str,
}

impl Display for StepPruned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pruned unreachable step '{}'", self.step_id)
    }
}

impl StructuredLog for StepPruned<'_> {
    fn log(&self) {
        tracing::debug!(step_id = self.step_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("step_pruned", span_name = name, step_id = self.step_id)
    }
}

/// A kept step requires an item that nothing supplies.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnsatisfiedDependency<'a> {
    pub step_id: &'a str,
    pub item: &'a str,
}

impl Display for UnsatisfiedDependency<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Step '{}' requires item '{}' which has no producer",
            self.step_id, self.item
        )
    }
}

impl StructuredLog for UnsatisfiedDependency<'_> {
    fn log(&self) {
        tracing::error!(
            step_id = self.step_id,
            item = self.item,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unsatisfied_dependency",
            span_name = name,
            step_id = self.step_id,
            item = self.item,
        )
    }
}

/// Cyclic dependency detected among kept steps.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_buildchain::observability::messages::chain::CyclicDependencyDetected;
///
/// let cycle = vec!["a", "b"];
/// let msg = CyclicDependencyDetected { cycle: &cycle };
/// assert_eq!(msg.to_string(), "Cyclic dependency detected: a -> b -> a");
/// ```
pub struct CyclicDependencyDetected<'a> {
    pub cycle: &'a [&'a str],
}

impl CyclicDependencyDetected<'_> {
    fn path(&self) -> String {
        let mut path = self.cycle.join(" -> ");
        if let Some(first) = self.cycle.first() {
            path.push_str(" -> ");
            path.push_str(first);
        }
        path
    }
}

impl Display for CyclicDependencyDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic dependency detected: {}", self.path())
    }
}

impl StructuredLog for CyclicDependencyDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.path(),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "cyclic_dependency",
            span_name = name,
            cycle = self.path(),
            cycle_length = self.cycle.len(),
        )
    }
}

/// A final item was requested but no registered step can produce it.
///
/// # Log Level
/// `warn!` - The build proceeds and the item is reported as not produced
pub struct FinalItemWithoutProducer<'a> {
    pub item: &'a str,
}

impl Display for FinalItemWithoutProducer<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Final item '{}' has no producer and will not be produced", self.item)
    }
}

impl StructuredLog for FinalItemWithoutProducer<'_> {
    fn log(&self) {
        tracing::warn!(item = self.item, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("final_without_producer", span_name = name, item = self.item)
    }
}

/// Chain construction finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ChainBuilt {
    pub registered: usize,
    pub kept: usize,
    pub wave_count: usize,
    pub duration: Duration,
}

impl Display for ChainBuilt {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Built chain: kept {} of {} registered steps ({} pruned) in {} waves, took {:?}",
            self.kept,
            self.registered,
            self.registered - self.kept,
            self.wave_count,
            self.duration
        )
    }
}

impl StructuredLog for ChainBuilt {
    fn log(&self) {
        tracing::info!(
            registered = self.registered,
            kept = self.kept,
            pruned = self.registered - self.kept,
            wave_count = self.wave_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "chain_built",
            span_name = name,
            registered = self.registered,
            kept = self.kept,
            wave_count = self.wave_count,
        )
    }
}

/// The chain graph was written as DOT.
///
/// # Log Level
/// `info!` - Requested diagnostic output
pub struct GraphWritten<'a> {
    pub path: &'a str,
    pub step_count: usize,
}

impl Display for GraphWritten<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Wrote build graph of {} steps to {}", self.step_count, self.path)
    }
}

impl StructuredLog for GraphWritten<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, step_count = self.step_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("graph_written", span_name = name, path = self.path)
    }
}

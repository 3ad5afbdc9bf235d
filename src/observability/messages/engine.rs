// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for executor lifecycle and execution events.
//!
//! This module contains message types for logging events related to:
//! * Build run lifecycle (start, completion, failure)
//! * Wave dispatch and the wave barrier
//! * Concurrency configuration

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Execution started with specified strategy and configuration.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_buildchain::observability::messages::engine::ExecutionStarted;
///
/// let msg = ExecutionStarted {
///     strategy: "waves",
///     step_count: 5,
///     wave_count: 3,
///     max_concurrency: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ExecutionStarted<'a> {
    pub strategy: &'a str,
    pub step_count: usize,
    pub wave_count: usize,
    pub max_concurrency: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting build with {} strategy: {} steps in {} waves, max_concurrency={}",
            self.strategy, self.step_count, self.wave_count, self.max_concurrency
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            step_count = self.step_count,
            wave_count = self.wave_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            strategy = self.strategy,
            step_count = self.step_count,
            wave_count = self.wave_count,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// Execution completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionCompleted<'a> {
    pub strategy: &'a str,
    pub step_count: usize,
    pub item_count: usize,
    pub duration: std::time::Duration,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Build completed with {} strategy: {} steps produced {} item kinds in {:?}",
            self.strategy, self.step_count, self.item_count, self.duration
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            step_count = self.step_count,
            item_count = self.item_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution_completed",
            span_name = name,
            strategy = self.strategy,
            step_count = self.step_count,
            duration = ?self.duration,
        )
    }
}

/// Execution failed with error.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_buildchain::observability::messages::engine::ExecutionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = ExecutionFailed {
///     strategy: "waves",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ExecutionFailed<'a> {
    pub strategy: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Build failed with {} strategy: {}", self.strategy, self.error)
    }
}

impl StructuredLog for ExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            strategy = self.strategy,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "execution_failed",
            span_name = name,
            strategy = self.strategy,
            error = %self.error,
        )
    }
}

/// A wave was released to the worker pool.
///
/// # Log Level
/// `debug!` - Per-wave progress
pub struct WaveStarted {
    pub wave: usize,
    pub step_count: usize,
}

impl Display for WaveStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dispatching wave {} with {} steps", self.wave, self.step_count)
    }
}

impl StructuredLog for WaveStarted {
    fn log(&self) {
        tracing::debug!(wave = self.wave, step_count = self.step_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "wave",
            span_name = name,
            wave = self.wave,
            step_count = self.step_count,
        )
    }
}

/// Every step of a wave finished and its outputs were merged.
///
/// # Log Level
/// `debug!` - Per-wave progress
pub struct WaveCompleted {
    pub wave: usize,
    pub step_count: usize,
    pub merged_values: usize,
    pub duration: std::time::Duration,
}

impl Display for WaveCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Wave {} completed: {} steps, {} values merged in {:?}",
            self.wave, self.step_count, self.merged_values, self.duration
        )
    }
}

impl StructuredLog for WaveCompleted {
    fn log(&self) {
        tracing::debug!(
            wave = self.wave,
            step_count = self.step_count,
            merged_values = self.merged_values,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("wave_completed", span_name = name, wave = self.wave)
    }
}

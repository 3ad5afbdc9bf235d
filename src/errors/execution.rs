// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while executing a built chain.

use std::fmt;
use thiserror::Error;

use crate::chain::{Cardinality, ItemId, StepId};
use crate::errors::ChainBuildError;

/// Misuse of [`StepInputs`](crate::chain::StepInputs) inside a step action.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Step '{step}' did not declare a consumption of {item}")]
    Undeclared { step: StepId, item: ItemId },

    #[error("Step '{step}' requires {item} but no value was produced")]
    Missing { step: StepId, item: ItemId },

    #[error("{item} is a {cardinality} item and must be read with consume_multi")]
    Cardinality { item: ItemId, cardinality: Cardinality },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepFailureKind {
    /// The action returned an error.
    Failed,
    /// The action panicked.
    Panicked,
    /// The action produced an item it did not declare, or a single item twice.
    InvalidProduction,
}

impl fmt::Display for StepFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepFailureKind::Failed => write!(f, "failed"),
            StepFailureKind::Panicked => write!(f, "panicked"),
            StepFailureKind::InvalidProduction => write!(f, "produced invalid output"),
        }
    }
}

/// One step's failure within a wave.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Step '{step}' {kind}: {message}")]
pub struct StepFailure {
    pub step: StepId,
    pub kind: StepFailureKind,
    pub message: String,
}

impl StepFailure {
    pub fn failed(step: StepId, error: &anyhow::Error) -> Self {
        Self {
            step,
            kind: StepFailureKind::Failed,
            // alternate form renders the whole context chain
            message: format!("{:#}", error),
        }
    }

    pub fn panicked(step: StepId, message: impl Into<String>) -> Self {
        Self {
            step,
            kind: StepFailureKind::Panicked,
            message: message.into(),
        }
    }

    pub fn invalid_production(step: StepId, message: impl Into<String>) -> Self {
        Self {
            step,
            kind: StepFailureKind::InvalidProduction,
            message: message.into(),
        }
    }
}

/// Every step failure observed in the wave that stopped the run.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Build failed in wave {wave} with {} step failure(s): {}", .causes.len(), render_causes(.causes))]
pub struct BuildFailure {
    pub wave: usize,
    pub causes: Vec<StepFailure>,
}

fn render_causes(causes: &[StepFailure]) -> String {
    causes
        .iter()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Chain(#[from] ChainBuildError),

    #[error(transparent)]
    Failed(#[from] BuildFailure),

    #[error("Item {item} was provided but is not declared as an initial item")]
    UndeclaredInitial { item: ItemId },

    #[error("Single initial item {item} was provided more than once")]
    DuplicateInitial { item: ItemId },

    /// A broken engine invariant. Never expected in a correctly built chain.
    #[error("Internal engine error: {message}")]
    Internal { message: String },
}

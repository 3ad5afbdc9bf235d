// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while registering steps, before any graph work.

use thiserror::Error;

use crate::chain::{ItemId, StepId};

/// A step (or initial item) declaration was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid declaration for step '{step}': {reason}")]
pub struct DeclarationError {
    pub step: StepId,
    pub reason: DeclarationReason,
}

impl DeclarationError {
    pub fn new(step: StepId, reason: DeclarationReason) -> Self {
        Self { step, reason }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclarationReason {
    /// The step neither produces nor consumes anything.
    #[error("step declares no produced or consumed items")]
    NoItemInteraction,

    #[error("a step with this id is already registered")]
    DuplicateStepId,

    /// A second producer with the same overridability for a single-valued item.
    #[error("{}producer of single item {item} conflicts with step '{existing}'", overridable_prefix(.overridable))]
    ConflictingSingleProducer {
        item: ItemId,
        existing: StepId,
        overridable: bool,
    },

    /// A single-valued initial item can only come from the caller.
    #[error("single item {item} is an initial item and cannot be produced by a step")]
    InitialItemProduced { item: ItemId },
}

fn overridable_prefix(overridable: &bool) -> &'static str {
    if *overridable {
        "overridable "
    } else {
        ""
    }
}

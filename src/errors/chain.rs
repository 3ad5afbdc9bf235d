// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while turning registered steps into an executable chain.

use std::path::PathBuf;
use thiserror::Error;

use crate::chain::{ItemId, StepId};

/// A kept step consumes an item with `Required` strength that nothing can supply.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("No producers for required item {item} consumed by step '{requesting_step}'")]
pub struct UnsatisfiedDependencyError {
    pub item: ItemId,
    pub requesting_step: StepId,
}

/// Steps that depend on each other in a loop.
///
/// `cycle[i]` runs before `cycle[i + 1]` because of `items[i]`; the last step
/// loops back to the first through the last item.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Cyclic dependency detected: {}", render_cycle(.cycle, .items))]
pub struct CyclicDependencyError {
    pub cycle: Vec<StepId>,
    pub items: Vec<ItemId>,
}

fn render_cycle(cycle: &[StepId], items: &[ItemId]) -> String {
    let mut rendered = String::new();
    for (step, item) in cycle.iter().zip(items) {
        rendered.push_str(&format!("{} -[{}]-> ", step, item));
    }
    if let Some(first) = cycle.first() {
        rendered.push_str(first.as_str());
    }
    rendered
}

#[derive(Debug, Error)]
pub enum ChainBuildError {
    #[error(transparent)]
    UnsatisfiedDependency(#[from] UnsatisfiedDependencyError),

    #[error(transparent)]
    CyclicDependency(#[from] CyclicDependencyError),

    #[error("Unknown build item '{name}'")]
    UnknownItem { name: String },

    #[error("Build item name '{name}' is ambiguous: {}", .candidates.join(", "))]
    AmbiguousItem { name: String, candidates: Vec<String> },

    #[error("Failed to write build graph to {}: {source}", .path.display())]
    GraphOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Build items, step declarations and chain construction.
//!
//! Steps are registered with a [`ChainBuilder`], which prunes, validates and
//! layers them into a [`BuildChain`]. The chain is then executed by the
//! [`engine`](crate::engine).

mod builder;
mod context;
pub mod dot;
mod graph;
mod item;
mod plan;
mod prune;
mod step;


pub use builder::{ChainBuilder, StepHandle};
pub use context::{StepInputs, StepOutputs};
pub use item::{BuildItem, Cardinality, Finality, ItemId, ItemRegistry, ItemValue};
pub use plan::{BuildChain, ChainPlan, StepPlan, WavePlan};
pub(crate) use plan::ChainStep;
pub use step::{
    no_op, Constraint, Consume, Produce, Requirement, StepBuilder, StepDescriptor, StepId,
};

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Immutable build step descriptors and the builder used to declare them.
//!
//! A descriptor records a step's identity, the item kinds it produces and
//! consumes, and the action that turns consumed values into produced values.
//! Descriptors are created once and shared read-only by every chain and run
//! that includes them.
//!
//! ```
//! use the_buildchain::chain::{BuildItem, Cardinality, StepDescriptor, StepOutputs};
//!
//! struct Source(String);
//! impl BuildItem for Source {
//!     const CARDINALITY: Cardinality = Cardinality::Single;
//! }
//!
//! struct Banner(String);
//! impl BuildItem for Banner {
//!     const CARDINALITY: Cardinality = Cardinality::Multi;
//! }
//!
//! let step = StepDescriptor::builder("banner")
//!     .consumes::<Source>()
//!     .produces::<Banner>()
//!     .build(|inputs| {
//!         let source = inputs.consume::<Source>()?;
//!         Ok(StepOutputs::new().with(Banner(format!("built from {}", source.0))))
//!     });
//!
//! assert_eq!(step.id().as_str(), "banner");
//! assert_eq!(step.consumes().len(), 1);
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::chain::context::{StepInputs, StepOutputs};
use crate::chain::item::{BuildItem, ItemId};
use crate::traits::StepAction;

/// Caller-chosen identity of a build step. Must be unique within a builder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StepId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Strength of a consumption. Ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Requirement {
    /// Run after the item's producers; no value delivered, no failure when nothing produces it.
    OrderOnly,
    /// Value delivered when produced; absence is not an error.
    Optional,
    /// A producer (or initial value) must exist or the chain fails to build.
    Required,
}

impl Requirement {
    /// Whether this consumption pulls the item's producers into the chain and receives values.
    pub fn carries_data(&self) -> bool {
        !matches!(self, Requirement::OrderOnly)
    }
}

/// One consumed item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consume {
    pub item: ItemId,
    pub requirement: Requirement,
}

/// Whether a production supplies a value or only orders the step before consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Real,
    OrderOnly,
}

/// One produced item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Produce {
    pub item: ItemId,
    pub constraint: Constraint,
    /// Producing this item never causes the step to be kept.
    pub weak: bool,
    /// Only used when no non-overridable producer of the item exists.
    pub overridable: bool,
}

impl Produce {
    pub fn is_real(&self) -> bool {
        self.constraint == Constraint::Real
    }

    /// Flags of an order-only declaration never affect a real one.
    fn merge(&mut self, other: Produce) {
        match (self.is_real(), other.is_real()) {
            (true, true) => {
                self.weak &= other.weak;
                self.overridable &= other.overridable;
            }
            (false, true) => *self = other,
            _ => {}
        }
    }
}

/// Immutable record of a single build step.
pub struct StepDescriptor {
    id: StepId,
    produces: Vec<Produce>,
    consumes: Vec<Consume>,
    always_active: bool,
    action: Arc<dyn StepAction>,
}

impl StepDescriptor {
    pub fn builder(id: impl Into<StepId>) -> StepBuilder {
        StepBuilder::new(id)
    }

    pub fn id(&self) -> &StepId {
        &self.id
    }

    pub fn produces(&self) -> &[Produce] {
        &self.produces
    }

    pub fn consumes(&self) -> &[Consume] {
        &self.consumes
    }

    /// Whether the step opts out of pruning.
    pub fn is_always_active(&self) -> bool {
        self.always_active
    }

    pub fn action(&self) -> &Arc<dyn StepAction> {
        &self.action
    }

    pub fn production_of(&self, item: &ItemId) -> Option<&Produce> {
        self.produces.iter().find(|p| &p.item == item)
    }

    pub fn consumption_of(&self, item: &ItemId) -> Option<&Consume> {
        self.consumes.iter().find(|c| &c.item == item)
    }

    /// Whether the step declared no item interaction at all.
    pub fn is_inert(&self) -> bool {
        self.produces.is_empty() && self.consumes.is_empty()
    }
}

impl fmt::Debug for StepDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("id", &self.id)
            .field("produces", &self.produces)
            .field("consumes", &self.consumes)
            .field("always_active", &self.always_active)
            .finish()
    }
}

/// Declares a [`StepDescriptor`].
///
/// Declaring the same consumed item more than once keeps the strongest
/// requirement (`Required` over `Optional` over `OrderOnly`). Declaring the
/// same produced item more than once keeps a real production over an
/// order-only one, and keeps it weak or overridable only if every declaration was.
pub struct StepBuilder {
    id: StepId,
    produces: Vec<Produce>,
    consumes: Vec<Consume>,
    always_active: bool,
}

impl StepBuilder {
    pub fn new(id: impl Into<StepId>) -> Self {
        Self {
            id: id.into(),
            produces: Vec::new(),
            consumes: Vec::new(),
            always_active: false,
        }
    }

    pub fn consumes<T: BuildItem>(self) -> Self {
        self.consume(ItemId::of::<T>(), Requirement::Required)
    }

    pub fn consumes_optional<T: BuildItem>(self) -> Self {
        self.consume(ItemId::of::<T>(), Requirement::Optional)
    }

    /// Run after every kept producer of `T` without receiving its value.
    pub fn after<T: BuildItem>(self) -> Self {
        self.consume(ItemId::of::<T>(), Requirement::OrderOnly)
    }

    pub fn consume(mut self, item: ItemId, requirement: Requirement) -> Self {
        match self.consumes.iter_mut().find(|c| c.item == item) {
            Some(existing) => existing.requirement = existing.requirement.max(requirement),
            None => self.consumes.push(Consume { item, requirement }),
        }
        self
    }

    pub fn produces<T: BuildItem>(self) -> Self {
        self.produce(ItemId::of::<T>(), Constraint::Real, false, false)
    }

    pub fn produces_weak<T: BuildItem>(self) -> Self {
        self.produce(ItemId::of::<T>(), Constraint::Real, true, false)
    }

    pub fn produces_overridable<T: BuildItem>(self) -> Self {
        self.produce(ItemId::of::<T>(), Constraint::Real, false, true)
    }

    /// Run before every kept consumer of `T` without producing it.
    pub fn before<T: BuildItem>(self) -> Self {
        self.produce(ItemId::of::<T>(), Constraint::OrderOnly, false, false)
    }

    pub fn produce(mut self, item: ItemId, constraint: Constraint, weak: bool, overridable: bool) -> Self {
        let produce = Produce {
            item,
            constraint,
            weak,
            overridable,
        };
        match self.produces.iter_mut().find(|p| p.item == item) {
            Some(existing) => existing.merge(produce),
            None => self.produces.push(produce),
        }
        self
    }

    /// Keep the step in every chain regardless of whether its outputs are consumed.
    pub fn always_active(mut self) -> Self {
        self.always_active = true;
        self
    }

    pub fn build<F>(self, action: F) -> StepDescriptor
    where
        F: Fn(&StepInputs) -> anyhow::Result<StepOutputs> + Send + Sync + 'static,
    {
        self.build_shared(Arc::new(action))
    }

    /// Build with a named [`StepAction`] implementation instead of a closure.
    pub fn build_action<A: StepAction + 'static>(self, action: A) -> StepDescriptor {
        self.build_shared(Arc::new(action))
    }

    pub fn build_shared(self, action: Arc<dyn StepAction>) -> StepDescriptor {
        StepDescriptor {
            id: self.id,
            produces: self.produces,
            consumes: self.consumes,
            always_active: self.always_active,
            action,
        }
    }
}

/// Action for steps that exist only for ordering: produces nothing.
pub fn no_op(_inputs: &StepInputs) -> anyhow::Result<StepOutputs> {
    Ok(StepOutputs::new())
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-run storage of produced item values.
//!
//! A store is created at the start of a run and only the executor's conductor
//! writes to it, between waves. Steps see copies of the `Arc` handles they
//! declared; the store itself is handed to the caller inside a
//! [`BuildResult`](crate::engine::BuildResult) when the run succeeds and
//! dropped otherwise.

use indexmap::IndexMap;

use crate::chain::{Cardinality, ItemId, ItemValue};
use crate::errors::BuildError;

/// Ordering key of values supplied by the caller.
pub(crate) const INITIAL_ORDER: usize = 0;

/// Ordering key of values produced by the step registered at `registration`.
pub(crate) fn step_order(registration: usize) -> usize {
    registration + 1
}

#[derive(Debug)]
enum Slot {
    Single(ItemValue),
    /// (ordering key, value), sorted by key; equal keys keep insertion order.
    Multi(Vec<(usize, ItemValue)>),
    Marker(ItemValue),
}

/// What [`BuildResult::get`](crate::engine::BuildResult::get) found for an item kind.
#[derive(Debug)]
pub enum Lookup<'a> {
    /// Pruned away, never requested, or requested but nothing produced it.
    NotProduced,
    Single(&'a ItemValue),
    /// Every contributed value in producer registration order.
    Multi(Vec<&'a ItemValue>),
    Marker,
}

impl Lookup<'_> {
    pub fn is_produced(&self) -> bool {
        !matches!(self, Lookup::NotProduced)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ResultStore {
    slots: IndexMap<ItemId, Slot>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one value. A second write to a `Single` item is an engine
    /// invariant violation.
    pub fn insert(&mut self, item: ItemId, order: usize, value: ItemValue) -> Result<(), BuildError> {
        match item.cardinality() {
            Cardinality::Single => {
                if self.slots.contains_key(&item) {
                    return Err(BuildError::Internal {
                        message: format!("single item {} was written more than once", item),
                    });
                }
                self.slots.insert(item, Slot::Single(value));
            }
            Cardinality::Multi => {
                let slot = self
                    .slots
                    .entry(item)
                    .or_insert_with(|| Slot::Multi(Vec::new()));
                if let Slot::Multi(values) = slot {
                    let position = values.partition_point(|(key, _)| *key <= order);
                    values.insert(position, (order, value));
                }
            }
            Cardinality::Marker => {
                self.slots.entry(item).or_insert(Slot::Marker(value));
            }
        }
        Ok(())
    }

    pub fn contains(&self, item: &ItemId) -> bool {
        self.slots.contains_key(item)
    }

    /// Every value stored for `item`, in aggregation order.
    pub fn value_refs(&self, item: &ItemId) -> Vec<&ItemValue> {
        match self.slots.get(item) {
            None => Vec::new(),
            Some(Slot::Single(value)) | Some(Slot::Marker(value)) => vec![value],
            Some(Slot::Multi(values)) => values.iter().map(|(_, value)| value).collect(),
        }
    }

    /// Cloned handles of every value stored for `item`, in aggregation order.
    pub fn values(&self, item: &ItemId) -> Vec<ItemValue> {
        self.value_refs(item).into_iter().cloned().collect()
    }

    pub fn lookup(&self, item: &ItemId) -> Lookup<'_> {
        match self.slots.get(item) {
            None => Lookup::NotProduced,
            Some(Slot::Single(value)) => Lookup::Single(value),
            Some(Slot::Multi(values)) => Lookup::Multi(values.iter().map(|(_, value)| value).collect()),
            Some(Slot::Marker(_)) => Lookup::Marker,
        }
    }

    /// Item kinds with at least one value, in first-merge order.
    pub fn items(&self) -> impl Iterator<Item = &ItemId> {
        self.slots.keys()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

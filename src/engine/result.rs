// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::chain::{BuildItem, ItemId, StepId};
use crate::engine::store::{Lookup, ResultStore};

/// Sealed outcome of a successful run.
///
/// Every produced item kind can be read back, final or not. Item kinds that
/// were pruned away or never produced report [`Lookup::NotProduced`].
#[derive(Debug)]
pub struct BuildResult {
    store: ResultStore,
    executed: Vec<StepId>,
    wave_count: usize,
    duration: Duration,
}

impl BuildResult {
    pub(crate) fn new(
        store: ResultStore,
        executed: Vec<StepId>,
        wave_count: usize,
        duration: Duration,
    ) -> Self {
        Self {
            store,
            executed,
            wave_count,
            duration,
        }
    }

    pub fn get(&self, item: &ItemId) -> Lookup<'_> {
        self.store.lookup(item)
    }

    /// The value of a `Single` or marker item, or the first value of a `Multi` item.
    pub fn consume<T: BuildItem>(&self) -> Option<&T> {
        self.typed::<T>().next()
    }

    pub fn consume_multi<T: BuildItem>(&self) -> Vec<&T> {
        self.typed::<T>().collect()
    }

    pub fn is_present<T: BuildItem>(&self) -> bool {
        self.store.contains(&ItemId::of::<T>())
    }

    fn typed<T: BuildItem>(&self) -> impl Iterator<Item = &T> {
        self.store
            .value_refs(&ItemId::of::<T>())
            .into_iter()
            .filter_map(|value| value.as_ref().downcast_ref::<T>())
    }

    /// Item kinds with at least one value, in first-merge order.
    pub fn items(&self) -> impl Iterator<Item = &ItemId> {
        self.store.items()
    }

    pub fn item_count(&self) -> usize {
        self.store.len()
    }

    /// Steps whose actions ran, in merge order.
    pub fn executed_steps(&self) -> &[StepId] {
        &self.executed
    }

    pub fn wave_count(&self) -> usize {
        self.wave_count
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

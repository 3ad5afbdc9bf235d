// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Values flowing into and out of a step action.
//!
//! A step never touches the result store. The executor hands it a
//! [`StepInputs`] snapshot holding the values of its `Required` and
//! `Optional` consumptions, and merges the returned [`StepOutputs`] itself.

use std::collections::HashMap;
use std::sync::Arc;

use crate::chain::item::{BuildItem, Cardinality, ItemId, ItemValue};
use crate::chain::step::StepId;
use crate::errors::InputError;

/// Consumed values made available to one step action.
#[derive(Debug)]
pub struct StepInputs {
    step: StepId,
    declared: Vec<ItemId>,
    values: HashMap<ItemId, Vec<ItemValue>>,
}

impl StepInputs {
    pub(crate) fn new(step: StepId) -> Self {
        Self {
            step,
            declared: Vec::new(),
            values: HashMap::new(),
        }
    }

    pub(crate) fn declare(&mut self, item: ItemId, values: Vec<ItemValue>) {
        self.declared.push(item);
        if !values.is_empty() {
            self.values.insert(item, values);
        }
    }

    pub fn step_id(&self) -> &StepId {
        &self.step
    }

    /// Number of data-carrying consumptions the step declared.
    pub fn declared_count(&self) -> usize {
        self.declared.len()
    }

    /// The value of a `Single` item this step consumes.
    pub fn consume<T: BuildItem>(&self) -> Result<&T, InputError> {
        let item = ItemId::of::<T>();
        if !self.declared.contains(&item) {
            return Err(InputError::Undeclared {
                step: self.step.clone(),
                item,
            });
        }
        if T::CARDINALITY == Cardinality::Multi {
            return Err(InputError::Cardinality {
                item,
                cardinality: T::CARDINALITY,
            });
        }
        self.get::<T>().ok_or(InputError::Missing {
            step: self.step.clone(),
            item,
        })
    }

    /// The value of a consumed item, if one was produced.
    pub fn get<T: BuildItem>(&self) -> Option<&T> {
        self.values
            .get(&ItemId::of::<T>())
            .and_then(|values| values.first())
            .and_then(|value| value.as_ref().downcast_ref::<T>())
    }

    /// Every value of a consumed `Multi` item, in producer registration order.
    pub fn consume_multi<T: BuildItem>(&self) -> Vec<&T> {
        self.values
            .get(&ItemId::of::<T>())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|value| value.as_ref().downcast_ref::<T>())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether any value of a consumed item (typically a marker) was produced.
    pub fn is_present<T: BuildItem>(&self) -> bool {
        self.values.contains_key(&ItemId::of::<T>())
    }
}

/// Values returned by a step action.
#[derive(Debug, Default)]
pub struct StepOutputs {
    values: Vec<(ItemId, ItemValue)>,
}

impl StepOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: BuildItem>(mut self, value: T) -> Self {
        self.produce(value);
        self
    }

    pub fn produce<T: BuildItem>(&mut self, value: T) -> &mut Self {
        self.values.push((ItemId::of::<T>(), Arc::new(value)));
        self
    }

    /// Produce several values of one `Multi` item.
    pub fn produce_all<T: BuildItem, I: IntoIterator<Item = T>>(&mut self, values: I) -> &mut Self {
        for value in values {
            self.produce(value);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemId> {
        self.values.iter().map(|(item, _)| item)
    }

    pub(crate) fn into_values(self) -> Vec<(ItemId, ItemValue)> {
        self.values
    }
}

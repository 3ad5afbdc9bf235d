// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dead-step elimination.
//!
//! The kept set is computed by walking backwards from the requested final
//! items: a step is kept when it supplies a final item, supplies an item
//! consumed (`Required` or `Optional`) by a kept step, or opts out of
//! pruning with `always_active`. `OrderOnly` consumption, order-only
//! production and weak production never pull a step in.
//!
//! Because the walk starts from what is needed rather than filtering what is
//! registered, the sole producer of an item a kept step needs is always kept.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use crate::chain::item::ItemId;
use crate::chain::step::{Produce, StepDescriptor};

/// One step's declaration of an item, with the step's registration index.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProducerRef {
    pub step: usize,
    pub produce: Produce,
}

/// Producers of every item kind, in registration order.
#[derive(Debug, Default)]
pub(crate) struct ProducerIndex {
    by_item: HashMap<ItemId, Vec<ProducerRef>>,
}

impl ProducerIndex {
    pub fn new(steps: &[Arc<StepDescriptor>]) -> Self {
        let mut by_item: HashMap<ItemId, Vec<ProducerRef>> = HashMap::new();
        for (step, descriptor) in steps.iter().enumerate() {
            for produce in descriptor.produces() {
                by_item.entry(produce.item).or_default().push(ProducerRef {
                    step,
                    produce: *produce,
                });
            }
        }
        Self { by_item }
    }

    /// Every declared producer of `item`, including weak and order-only ones.
    pub fn producers(&self, item: &ItemId) -> &[ProducerRef] {
        self.by_item.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Producers that supply values of `item`: the regular ones when any
    /// exist, otherwise the overridable ones.
    pub fn suppliers(&self, item: &ItemId) -> Vec<ProducerRef> {
        let real: Vec<ProducerRef> = self
            .producers(item)
            .iter()
            .filter(|p| p.produce.is_real())
            .copied()
            .collect();

        if real.iter().any(|p| !p.produce.overridable) {
            real.into_iter().filter(|p| !p.produce.overridable).collect()
        } else {
            real
        }
    }
}

/// Registration indices of every step that must run to produce `finals`.
pub(crate) fn reachable_steps(
    steps: &[Arc<StepDescriptor>],
    index: &ProducerIndex,
    finals: &[ItemId],
) -> BTreeSet<usize> {
    let mut kept = BTreeSet::new();
    let mut queue = VecDeque::new();

    for item in finals {
        pull_suppliers(index, item, &mut kept, &mut queue);
    }

    for (step, descriptor) in steps.iter().enumerate() {
        if descriptor.is_always_active() && kept.insert(step) {
            queue.push_back(step);
        }
    }

    while let Some(step) = queue.pop_front() {
        for consume in steps[step].consumes() {
            if consume.requirement.carries_data() {
                pull_suppliers(index, &consume.item, &mut kept, &mut queue);
            }
        }
    }

    kept
}

fn pull_suppliers(
    index: &ProducerIndex,
    item: &ItemId,
    kept: &mut BTreeSet<usize>,
    queue: &mut VecDeque<usize>,
) {
    for supplier in index.suppliers(item) {
        if !supplier.produce.weak && kept.insert(supplier.step) {
            queue.push_back(supplier.step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::item::{BuildItem, Cardinality};
    use crate::chain::step::no_op;

    struct X;
    impl BuildItem for X {
        const CARDINALITY: Cardinality = Cardinality::Single;
    }

    struct Y;
    impl BuildItem for Y {
        const CARDINALITY: Cardinality = Cardinality::Single;
    }

    struct Z;
    impl BuildItem for Z {
        const CARDINALITY: Cardinality = Cardinality::Multi;
    }

    fn kept_ids(steps: &[Arc<StepDescriptor>], finals: &[ItemId]) -> Vec<String> {
        let index = ProducerIndex::new(steps);
        reachable_steps(steps, &index, finals)
            .into_iter()
            .map(|i| steps[i].id().to_string())
            .collect()
    }

    #[test]
    fn test_walks_back_from_finals() {
        let steps = vec![
            Arc::new(StepDescriptor::builder("p").produces::<X>().build(no_op)),
            Arc::new(StepDescriptor::builder("q").consumes::<X>().produces::<Y>().build(no_op)),
            Arc::new(StepDescriptor::builder("r").produces::<Z>().build(no_op)),
        ];

        assert_eq!(kept_ids(&steps, &[ItemId::of::<Y>()]), vec!["p", "q"]);
        assert!(kept_ids(&steps, &[]).is_empty());
    }

    #[test]
    fn test_always_active_seeds_walk() {
        let steps = vec![
            Arc::new(StepDescriptor::builder("p").produces::<X>().build(no_op)),
            Arc::new(
                StepDescriptor::builder("audit")
                    .consumes_optional::<X>()
                    .produces::<Z>()
                    .always_active()
                    .build(no_op),
            ),
        ];

        assert_eq!(kept_ids(&steps, &[]), vec!["p", "audit"]);
    }

    #[test]
    fn test_order_only_and_weak_do_not_pull() {
        let steps = vec![
            Arc::new(StepDescriptor::builder("weak").produces_weak::<X>().build(no_op)),
            Arc::new(StepDescriptor::builder("before").before::<Y>().produces::<Z>().build(no_op)),
            Arc::new(
                StepDescriptor::builder("consumer")
                    .consumes_optional::<X>()
                    .after::<Z>()
                    .produces::<Y>()
                    .build(no_op),
            ),
        ];

        assert_eq!(kept_ids(&steps, &[ItemId::of::<Y>()]), vec!["consumer"]);
    }

    #[test]
    fn test_before_then_weak_stays_pruned() {
        let steps = vec![Arc::new(
            StepDescriptor::builder("metrics")
                .before::<X>()
                .produces_weak::<X>()
                .build(no_op),
        )];
        assert!(kept_ids(&steps, &[ItemId::of::<X>()]).is_empty());
    }

    #[test]
    fn test_overridable_only_used_without_regular_producer() {
        let steps = vec![
            Arc::new(StepDescriptor::builder("default").produces_overridable::<X>().build(no_op)),
            Arc::new(StepDescriptor::builder("custom").produces::<X>().build(no_op)),
        ];
        assert_eq!(kept_ids(&steps, &[ItemId::of::<X>()]), vec!["custom"]);

        let steps = vec![Arc::new(
            StepDescriptor::builder("default").produces_overridable::<X>().build(no_op),
        )];
        assert_eq!(kept_ids(&steps, &[ItemId::of::<X>()]), vec!["default"]);
    }
}

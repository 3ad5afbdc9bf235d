// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Step dependency graph over the kept steps.
//!
//! Nodes are registration indices. An edge `producer -> consumer` exists when
//! the producer declares any production of an item (real or order-only, weak
//! or not) that the consumer declares any consumption of (`Required`,
//! `Optional` or `OrderOnly`). Adjacency is kept in ordered maps so every
//! traversal visits steps in registration order.
//!
//! # Algorithms
//!
//! ## Cycle Detection
//! Depth-first search with a recursion stack. When a neighbor is found on the
//! stack, the path segment from that neighbor to the current node is the
//! cycle; the item carried by each edge is tracked alongside the path.
//! - **Time Complexity**: O(V + E)
//! - **Space Complexity**: O(V)
//!
//! ## Wave Layering
//! Kahn's algorithm processed level by level: wave 0 holds every step with no
//! dependencies, wave `n + 1` holds every step whose last dependency completed
//! in wave `n`. Steps within a wave are ordered by registration index.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use crate::chain::item::ItemId;
use crate::chain::prune::ProducerIndex;
use crate::chain::step::StepDescriptor;

/// A cycle found in the graph: `steps[i]` feeds `steps[i + 1]` through
/// `items[i]`, and the last step feeds the first through the last item.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CycleTrace {
    pub steps: Vec<usize>,
    pub items: Vec<ItemId>,
}

#[derive(Debug, Default)]
pub(crate) struct DependencyGraph {
    nodes: BTreeSet<usize>,
    /// producer -> (consumer -> first item linking them)
    dependents: BTreeMap<usize, BTreeMap<usize, ItemId>>,
    /// consumer -> producers
    dependencies: BTreeMap<usize, BTreeSet<usize>>,
}

impl DependencyGraph {
    pub fn build(
        steps: &[Arc<StepDescriptor>],
        index: &ProducerIndex,
        kept: &BTreeSet<usize>,
    ) -> Self {
        let mut graph = Self::default();

        for &consumer in kept {
            graph.nodes.insert(consumer);
            for consume in steps[consumer].consumes() {
                for producer in index.producers(&consume.item) {
                    if kept.contains(&producer.step) {
                        graph.add_edge(producer.step, consumer, consume.item);
                    }
                }
            }
        }

        graph
    }

    fn add_edge(&mut self, producer: usize, consumer: usize, item: ItemId) {
        self.dependents
            .entry(producer)
            .or_default()
            .entry(consumer)
            .or_insert(item);
        self.dependencies.entry(consumer).or_default().insert(producer);
    }

    pub fn dependencies_of(&self, step: usize) -> impl Iterator<Item = usize> + '_ {
        self.dependencies.get(&step).into_iter().flatten().copied()
    }

    pub fn dependents_of(&self, step: usize) -> impl Iterator<Item = usize> + '_ {
        self.dependents.get(&step).into_iter().flat_map(|d| d.keys().copied())
    }

    #[cfg(test)]
    pub fn edge_count(&self) -> usize {
        self.dependents.values().map(BTreeMap::len).sum()
    }

    /// First cycle found when starting the search from each step in
    /// registration order, or `None` when the graph is acyclic.
    pub fn detect_cycle(&self) -> Option<CycleTrace> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();
        let mut via = Vec::new();

        for &node in &self.nodes {
            if !visited.contains(&node) {
                if let Some(cycle) =
                    self.dfs_cycle_detection(node, &mut visited, &mut rec_stack, &mut path, &mut via)
                {
                    return Some(cycle);
                }
            }
        }

        None
    }

    /// `via[k]` is the item on the edge `path[k] -> path[k + 1]`.
    fn dfs_cycle_detection(
        &self,
        node: usize,
        visited: &mut HashSet<usize>,
        rec_stack: &mut HashSet<usize>,
        path: &mut Vec<usize>,
        via: &mut Vec<ItemId>,
    ) -> Option<CycleTrace> {
        visited.insert(node);
        rec_stack.insert(node);
        path.push(node);

        if let Some(neighbors) = self.dependents.get(&node) {
            for (&next, &item) in neighbors {
                if !visited.contains(&next) {
                    via.push(item);
                    if let Some(cycle) = self.dfs_cycle_detection(next, visited, rec_stack, path, via) {
                        return Some(cycle);
                    }
                    via.pop();
                } else if rec_stack.contains(&next) {
                    if let Some(start) = path.iter().position(|&n| n == next) {
                        let mut items = via[start..].to_vec();
                        items.push(item);
                        return Some(CycleTrace {
                            steps: path[start..].to_vec(),
                            items,
                        });
                    }
                }
            }
        }

        rec_stack.remove(&node);
        path.pop();
        None
    }

    /// Wave layering of an acyclic graph. Steps caught in a cycle are never
    /// placed, so callers run [`detect_cycle`](Self::detect_cycle) first.
    pub fn waves(&self) -> Vec<Vec<usize>> {
        let mut in_degree: BTreeMap<usize, usize> = self
            .nodes
            .iter()
            .map(|&node| (node, self.dependencies.get(&node).map_or(0, BTreeSet::len)))
            .collect();

        let mut current: Vec<usize> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&node, _)| node)
            .collect();

        let mut waves = Vec::new();
        while !current.is_empty() {
            let mut next = BTreeSet::new();
            for &node in &current {
                for dependent in self.dependents_of(node) {
                    if let Some(degree) = in_degree.get_mut(&dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            next.insert(dependent);
                        }
                    }
                }
            }
            waves.push(current);
            current = next.into_iter().collect();
        }

        waves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::item::{BuildItem, Cardinality};
    use crate::chain::step::no_op;

    struct A;
    impl BuildItem for A {
        const CARDINALITY: Cardinality = Cardinality::Single;
    }

    struct B;
    impl BuildItem for B {
        const CARDINALITY: Cardinality = Cardinality::Single;
    }

    struct C;
    impl BuildItem for C {
        const CARDINALITY: Cardinality = Cardinality::Multi;
    }

    fn graph_of(steps: &[Arc<StepDescriptor>]) -> DependencyGraph {
        let index = ProducerIndex::new(steps);
        let kept: BTreeSet<usize> = (0..steps.len()).collect();
        DependencyGraph::build(steps, &index, &kept)
    }

    #[test]
    fn test_diamond_layers() {
        let steps = vec![
            Arc::new(StepDescriptor::builder("root").produces::<B>().build(no_op)),
            Arc::new(StepDescriptor::builder("left").consumes::<B>().produces::<C>().build(no_op)),
            Arc::new(StepDescriptor::builder("right").consumes::<B>().produces::<C>().build(no_op)),
            Arc::new(StepDescriptor::builder("sink").consumes_optional::<C>().produces::<A>().build(no_op)),
        ];

        let graph = graph_of(&steps);
        assert!(graph.detect_cycle().is_none());
        assert_eq!(graph.waves(), vec![vec![0], vec![1, 2], vec![3]]);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.dependencies_of(3).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(graph.dependents_of(0).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_cycle_trace_carries_items() {
        let steps = vec![
            Arc::new(StepDescriptor::builder("a").consumes::<B>().produces::<A>().build(no_op)),
            Arc::new(StepDescriptor::builder("b").consumes::<A>().produces::<B>().build(no_op)),
        ];

        let cycle = graph_of(&steps).detect_cycle().expect("cycle expected");
        assert_eq!(cycle.steps, vec![0, 1]);
        assert_eq!(cycle.items, vec![ItemId::of::<A>(), ItemId::of::<B>()]);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let steps = vec![Arc::new(
            StepDescriptor::builder("loop").consumes_optional::<C>().produces::<C>().build(no_op),
        )];

        let cycle = graph_of(&steps).detect_cycle().expect("cycle expected");
        assert_eq!(cycle.steps, vec![0]);
        assert_eq!(cycle.items, vec![ItemId::of::<C>()]);
    }

    #[test]
    fn test_order_only_edges_constrain_waves() {
        let steps = vec![
            Arc::new(StepDescriptor::builder("late").after::<C>().produces::<A>().build(no_op)),
            Arc::new(StepDescriptor::builder("early").before::<C>().produces::<B>().build(no_op)),
        ];

        let graph = graph_of(&steps);
        assert_eq!(graph.waves(), vec![vec![1], vec![0]]);
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Step registration and chain construction.
//!
//! [`ChainBuilder`] accepts step descriptors in any order, rejects bad
//! declarations immediately, and turns the registered population into an
//! executable [`BuildChain`]:
//!
//! 1. **Prune**: walk backwards from the requested final items
//! 2. **Validate**: every `Required` consumption of a kept step has a kept
//!    producer or is an initial item
//! 3. **Cycle detection**: depth-first search over the kept steps
//! 4. **Layering**: partition the kept steps into waves
//!
//! # Example
//! ```
//! use the_buildchain::chain::{BuildItem, Cardinality, ChainBuilder, StepDescriptor, StepOutputs};
//!
//! struct Sources(Vec<String>);
//! impl BuildItem for Sources {
//!     const CARDINALITY: Cardinality = Cardinality::Single;
//! }
//!
//! struct Compiled(usize);
//! impl BuildItem for Compiled {
//!     const CARDINALITY: Cardinality = Cardinality::Single;
//! }
//!
//! let mut builder = ChainBuilder::new();
//! builder
//!     .register(StepDescriptor::builder("scan").produces::<Sources>().build(|_| {
//!         Ok(StepOutputs::new().with(Sources(vec!["Main.java".into()])))
//!     }))
//!     .unwrap();
//! builder
//!     .register(
//!         StepDescriptor::builder("compile")
//!             .consumes::<Sources>()
//!             .produces::<Compiled>()
//!             .build(|inputs| {
//!                 let sources = inputs.consume::<Sources>()?;
//!                 Ok(StepOutputs::new().with(Compiled(sources.0.len())))
//!             }),
//!     )
//!     .unwrap();
//! builder.request_final::<Compiled>();
//!
//! let chain = builder.build().unwrap();
//! assert_eq!(chain.wave_count(), 2);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::chain::dot;
use crate::chain::graph::DependencyGraph;
use crate::chain::item::{BuildItem, ItemId, ItemRegistry};
use crate::chain::plan::BuildChain;
use crate::chain::prune::{reachable_steps, ProducerIndex};
use crate::chain::step::{Requirement, StepDescriptor, StepId};
use crate::config::consts::GRAPH_OUTPUT_ENV;
use crate::engine::BuildResult;
use crate::errors::{
    BuildError, ChainBuildError, CyclicDependencyError, DeclarationError, DeclarationReason,
    UnsatisfiedDependencyError,
};
use crate::observability::messages::chain::{
    ChainBuilt, CyclicDependencyDetected, DeclarationRejected, FinalItemWithoutProducer,
    StepPruned, StepRegistered, UnsatisfiedDependency,
};
use crate::observability::messages::StructuredLog;

/// Receipt for a registered step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepHandle {
    index: usize,
    id: StepId,
}

impl StepHandle {
    /// Position in registration order, the tie-break for `Multi` aggregation.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> &StepId {
        &self.id
    }
}

#[derive(Debug, Default)]
pub struct ChainBuilder {
    steps: Vec<Arc<StepDescriptor>>,
    step_ids: HashSet<StepId>,
    items: ItemRegistry,
    /// (item, overridable) -> registration index of the real producer of a `Single` item
    single_producers: HashMap<(ItemId, bool), usize>,
    graph_output: Option<PathBuf>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step. Rejected declarations leave the builder unchanged.
    pub fn register(&mut self, step: StepDescriptor) -> Result<StepHandle, DeclarationError> {
        if let Err(error) = self.check_declaration(&step) {
            DeclarationRejected {
                step_id: step.id().as_str(),
                reason: &error,
            }
            .log();
            return Err(error);
        }

        let index = self.steps.len();
        for produce in step.produces() {
            self.items.note(produce.item);
            if produce.is_real() && produce.item.is_single() {
                self.single_producers
                    .insert((produce.item, produce.overridable), index);
            }
        }
        for consume in step.consumes() {
            self.items.note(consume.item);
        }

        StepRegistered {
            step_id: step.id().as_str(),
            produces: step.produces().len(),
            consumes: step.consumes().len(),
        }
        .log();

        let id = step.id().clone();
        self.step_ids.insert(id.clone());
        self.steps.push(Arc::new(step));
        Ok(StepHandle { index, id })
    }

    fn check_declaration(&self, step: &StepDescriptor) -> Result<(), DeclarationError> {
        let reject = |reason: DeclarationReason| -> Result<(), DeclarationError> {
            Err(DeclarationError::new(step.id().clone(), reason))
        };

        if self.step_ids.contains(step.id()) {
            return reject(DeclarationReason::DuplicateStepId);
        }
        if step.is_inert() {
            return reject(DeclarationReason::NoItemInteraction);
        }

        for produce in step.produces() {
            if !produce.is_real() || !produce.item.is_single() {
                continue;
            }
            if self.items.is_initial(&produce.item) {
                return reject(DeclarationReason::InitialItemProduced { item: produce.item });
            }
            if let Some(&existing) = self.single_producers.get(&(produce.item, produce.overridable)) {
                return reject(DeclarationReason::ConflictingSingleProducer {
                    item: produce.item,
                    existing: self.steps[existing].id().clone(),
                    overridable: produce.overridable,
                });
            }
        }

        Ok(())
    }

    /// Declare `T` as supplied by the caller when the chain is executed.
    pub fn add_initial<T: BuildItem>(&mut self) -> Result<&mut Self, DeclarationError> {
        self.add_initial_id(ItemId::of::<T>())
    }

    pub fn add_initial_id(&mut self, item: ItemId) -> Result<&mut Self, DeclarationError> {
        if item.is_single() {
            let producer = [false, true]
                .iter()
                .find_map(|&overridable| self.single_producers.get(&(item, overridable)));
            if let Some(&index) = producer {
                let error = DeclarationError::new(
                    self.steps[index].id().clone(),
                    DeclarationReason::InitialItemProduced { item },
                );
                DeclarationRejected {
                    step_id: self.steps[index].id().as_str(),
                    reason: &error,
                }
                .log();
                return Err(error);
            }
        }

        self.items.mark_initial(item);
        Ok(self)
    }

    /// Mark `T` as a requested output that must survive pruning.
    pub fn request_final<T: BuildItem>(&mut self) -> &mut Self {
        self.request_final_id(ItemId::of::<T>())
    }

    pub fn request_final_id(&mut self, item: ItemId) -> &mut Self {
        self.items.mark_final(item);
        self
    }

    /// Request a final item by type name. Only kinds already seen by a
    /// registration or initial declaration can be resolved.
    pub fn request_final_named(&mut self, name: &str) -> Result<ItemId, ChainBuildError> {
        let item = self.items.resolve(name)?;
        self.items.mark_final(item);
        Ok(item)
    }

    /// Write the built chain as a DOT digraph to `path`.
    pub fn graph_output(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.graph_output = Some(path.into());
        self
    }

    pub fn items(&self) -> &ItemRegistry {
        &self.items
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn build(&self) -> Result<BuildChain, ChainBuildError> {
        let started = Instant::now();
        let index = ProducerIndex::new(&self.steps);
        let finals: Vec<ItemId> = self.items.finals().copied().collect();

        for item in &finals {
            if index.suppliers(item).is_empty() && !self.items.is_initial(item) {
                FinalItemWithoutProducer { item: item.name() }.log();
            }
        }

        let kept = reachable_steps(&self.steps, &index, &finals);
        for (step, descriptor) in self.steps.iter().enumerate() {
            if !kept.contains(&step) {
                StepPruned {
                    step_id: descriptor.id().as_str(),
                }
                .log();
            }
        }

        self.validate_required(&index, &kept)?;

        let graph = DependencyGraph::build(&self.steps, &index, &kept);
        if let Some(trace) = graph.detect_cycle() {
            let names: Vec<&str> = trace
                .steps
                .iter()
                .map(|&step| self.steps[step].id().as_str())
                .collect();
            CyclicDependencyDetected { cycle: &names }.log();

            return Err(CyclicDependencyError {
                cycle: trace
                    .steps
                    .iter()
                    .map(|&step| self.steps[step].id().clone())
                    .collect(),
                items: trace.items,
            }
            .into());
        }

        let waves = graph.waves();
        let chain = BuildChain::assemble(&self.steps, &kept, &graph, &waves, &index, &self.items);

        ChainBuilt {
            registered: self.steps.len(),
            kept: chain.step_count(),
            wave_count: chain.wave_count(),
            duration: started.elapsed(),
        }
        .log();

        if let Some(path) = self.resolve_graph_output() {
            dot::write_graph(&chain, &path)?;
        }

        Ok(chain)
    }

    /// Build the chain and execute it with the default executor.
    pub async fn run(&self) -> Result<BuildResult, BuildError> {
        let chain = self.build()?;
        chain.run().await
    }

    /// Every unsatisfied `Required` consumption is logged; the first one in
    /// registration order is returned.
    fn validate_required(
        &self,
        index: &ProducerIndex,
        kept: &BTreeSet<usize>,
    ) -> Result<(), UnsatisfiedDependencyError> {
        let mut first = None;

        for &step in kept {
            let descriptor = &self.steps[step];
            for consume in descriptor.consumes() {
                if consume.requirement != Requirement::Required
                    || self.items.is_initial(&consume.item)
                {
                    continue;
                }
                let satisfied = index
                    .producers(&consume.item)
                    .iter()
                    .any(|p| p.produce.is_real() && kept.contains(&p.step));
                if !satisfied {
                    UnsatisfiedDependency {
                        step_id: descriptor.id().as_str(),
                        item: consume.item.name(),
                    }
                    .log();
                    first.get_or_insert_with(|| UnsatisfiedDependencyError {
                        item: consume.item,
                        requesting_step: descriptor.id().clone(),
                    });
                }
            }
        }

        match first {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn resolve_graph_output(&self) -> Option<PathBuf> {
        self.graph_output.clone().or_else(|| {
            env::var_os(GRAPH_OUTPUT_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
    }
}

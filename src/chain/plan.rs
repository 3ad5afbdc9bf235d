// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The executable result of chain construction.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::chain::graph::DependencyGraph;
use crate::chain::item::{ItemId, ItemRegistry};
use crate::chain::prune::ProducerIndex;
use crate::chain::step::{StepDescriptor, StepId};
use crate::engine::{BuildResult, ExecutionBuilder};
use crate::errors::BuildError;
use crate::traits::BuildExecutor;

/// A kept step with everything the executor needs precomputed.
#[derive(Debug)]
pub(crate) struct ChainStep {
    pub descriptor: Arc<StepDescriptor>,
    /// Registration index, the `Multi` ordering key.
    pub registration: usize,
    pub wave: usize,
    /// Indices into [`BuildChain::chain_steps`].
    pub dependencies: Vec<usize>,
    /// `Single` items this step produces overridably while a regular producer is also kept.
    pub overridden: Vec<ItemId>,
}

/// Pruned, validated and layered steps, ready to run any number of times.
///
/// A chain holds no per-run state; every run gets a fresh result store.
#[derive(Debug)]
pub struct BuildChain {
    steps: Vec<ChainStep>,
    waves: Vec<Vec<usize>>,
    finals: Vec<ItemId>,
    initials: Vec<ItemId>,
    pruned: Vec<StepId>,
    registered: usize,
}

impl BuildChain {
    pub(crate) fn assemble(
        registered: &[Arc<StepDescriptor>],
        kept: &BTreeSet<usize>,
        graph: &DependencyGraph,
        waves: &[Vec<usize>],
        index: &ProducerIndex,
        items: &ItemRegistry,
    ) -> Self {
        // registration index -> chain index
        let positions: HashMap<usize, usize> = kept
            .iter()
            .enumerate()
            .map(|(position, &step)| (step, position))
            .collect();

        let mut wave_of = HashMap::new();
        for (wave, steps) in waves.iter().enumerate() {
            for &step in steps {
                wave_of.insert(step, wave);
            }
        }

        let steps = kept
            .iter()
            .map(|&step| {
                let descriptor = Arc::clone(&registered[step]);
                let overridden = descriptor
                    .produces()
                    .iter()
                    .filter(|p| p.is_real() && p.overridable && p.item.is_single())
                    .filter(|p| {
                        index.producers(&p.item).iter().any(|other| {
                            other.produce.is_real()
                                && !other.produce.overridable
                                && kept.contains(&other.step)
                        })
                    })
                    .map(|p| p.item)
                    .collect();

                ChainStep {
                    registration: step,
                    wave: wave_of.get(&step).copied().unwrap_or_default(),
                    dependencies: graph
                        .dependencies_of(step)
                        .filter_map(|dependency| positions.get(&dependency).copied())
                        .collect(),
                    overridden,
                    descriptor,
                }
            })
            .collect();

        let waves = waves
            .iter()
            .map(|wave| {
                wave.iter()
                    .filter_map(|step| positions.get(step).copied())
                    .collect()
            })
            .collect();

        let pruned = registered
            .iter()
            .enumerate()
            .filter(|(step, _)| !kept.contains(step))
            .map(|(_, descriptor)| descriptor.id().clone())
            .collect();

        Self {
            steps,
            waves,
            finals: items.finals().copied().collect(),
            initials: items.initials().copied().collect(),
            pruned,
            registered: registered.len(),
        }
    }

    pub(crate) fn chain_steps(&self) -> &[ChainStep] {
        &self.steps
    }

    pub(crate) fn wave_indices(&self) -> &[Vec<usize>] {
        &self.waves
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    pub fn registered_count(&self) -> usize {
        self.registered
    }

    /// Kept steps in registration order.
    pub fn steps(&self) -> impl Iterator<Item = &StepDescriptor> {
        self.steps.iter().map(|step| step.descriptor.as_ref())
    }

    pub fn contains_step(&self, id: &str) -> bool {
        self.steps.iter().any(|step| step.descriptor.id().as_str() == id)
    }

    /// Step ids per wave, in execution order.
    pub fn waves(&self) -> Vec<Vec<&StepId>> {
        self.waves
            .iter()
            .map(|wave| wave.iter().map(|&i| self.steps[i].descriptor.id()).collect())
            .collect()
    }

    /// Zero-based wave of a kept step.
    pub fn wave_of(&self, id: &str) -> Option<usize> {
        self.steps
            .iter()
            .find(|step| step.descriptor.id().as_str() == id)
            .map(|step| step.wave)
    }

    /// Ids of the kept steps `id` must run after.
    pub fn dependencies_of(&self, id: &str) -> Vec<&StepId> {
        self.steps
            .iter()
            .find(|step| step.descriptor.id().as_str() == id)
            .map(|step| {
                step.dependencies
                    .iter()
                    .map(|&d| self.steps[d].descriptor.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn pruned(&self) -> &[StepId] {
        &self.pruned
    }

    pub fn final_items(&self) -> &[ItemId] {
        &self.finals
    }

    pub fn initial_items(&self) -> &[ItemId] {
        &self.initials
    }

    pub fn plan(&self) -> ChainPlan {
        ChainPlan {
            registered_steps: self.registered,
            final_items: self.finals.clone(),
            initial_items: self.initials.clone(),
            waves: self
                .waves
                .iter()
                .enumerate()
                .map(|(wave, steps)| WavePlan {
                    wave,
                    steps: steps.iter().map(|&i| self.step_plan(i)).collect(),
                })
                .collect(),
            pruned: self.pruned.clone(),
        }
    }

    fn step_plan(&self, index: usize) -> StepPlan {
        let step = &self.steps[index];
        StepPlan {
            id: step.descriptor.id().clone(),
            depends_on: step
                .dependencies
                .iter()
                .map(|&d| self.steps[d].descriptor.id().clone())
                .collect(),
            produces: step
                .descriptor
                .produces()
                .iter()
                .filter(|p| p.is_real())
                .map(|p| p.item)
                .collect(),
            consumes: step
                .descriptor
                .consumes()
                .iter()
                .filter(|c| c.requirement.carries_data())
                .map(|c| c.item)
                .collect(),
        }
    }

    /// Start a run that supplies initial items.
    pub fn execution(&self) -> ExecutionBuilder<'_> {
        ExecutionBuilder::new(self)
    }

    /// Run with the default [`WaveExecutor`](crate::engine::WaveExecutor) and no initial items.
    pub async fn run(&self) -> Result<BuildResult, BuildError> {
        self.execution().run().await
    }

    pub async fn run_with(&self, executor: &dyn BuildExecutor) -> Result<BuildResult, BuildError> {
        self.execution().run_with(executor).await
    }
}

/// Serializable summary of a built chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainPlan {
    pub registered_steps: usize,
    pub final_items: Vec<ItemId>,
    pub initial_items: Vec<ItemId>,
    pub waves: Vec<WavePlan>,
    pub pruned: Vec<StepId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WavePlan {
    pub wave: usize,
    pub steps: Vec<StepPlan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepPlan {
    pub id: StepId,
    pub depends_on: Vec<StepId>,
    pub produces: Vec<ItemId>,
    pub consumes: Vec<ItemId>,
}

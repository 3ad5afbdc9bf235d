// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::Instrument;

use crate::chain::{BuildChain, ChainStep, StepInputs, StepOutputs};
use crate::config::consts::DEFAULT_MAX_CONCURRENCY;
use crate::engine::store::{step_order, ResultStore, INITIAL_ORDER};
use crate::engine::{BuildResult, InitialItems};
use crate::errors::{BuildError, BuildFailure, StepFailure};
use crate::observability::messages::engine::{
    ExecutionCompleted, ExecutionFailed, ExecutionStarted, WaveCompleted, WaveStarted,
};
use crate::observability::messages::step::{
    OverriddenValueDiscarded, StepCompleted, StepFailed, StepStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::BuildExecutor;

const STRATEGY: &str = "waves";

/// Wave executor that runs a chain one wave at a time on a bounded worker pool.
///
/// ## Execution Strategy
///
/// 1. **Seeding**: caller-provided initial values are validated and stored
/// 2. **Dispatch**: every step of the current wave receives a snapshot of its
///    consumed values and runs on tokio's blocking pool, at most
///    `max_concurrency` at a time
/// 3. **Barrier**: the conductor awaits every step of the wave, including
///    after a failure, so no step is interrupted
/// 4. **Merge**: outputs are merged into the result store in registration
///    order before the next wave is released
///
/// Any failure in a wave stops the run after that wave and is reported
/// together with every other failure of the same wave.
///
/// ## Determinism
///
/// `Multi` values are keyed by producer registration order when merged, so
/// task completion order never shows up in results.
pub struct WaveExecutor {
    /// Maximum number of step actions running at once
    max_concurrency: usize,
}

impl WaveExecutor {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1), // Ensure at least 1
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    fn seed_store(chain: &BuildChain, initial: InitialItems) -> Result<ResultStore, BuildError> {
        let mut store = ResultStore::new();
        for (item, value) in initial.into_values() {
            if !chain.initial_items().contains(&item) {
                return Err(BuildError::UndeclaredInitial { item });
            }
            if item.is_single() && store.contains(&item) {
                return Err(BuildError::DuplicateInitial { item });
            }
            store.insert(item, INITIAL_ORDER, value)?;
        }
        Ok(store)
    }

    /// Snapshot of the values a step consumes with `Required` or `Optional` strength.
    fn collect_inputs(step: &ChainStep, store: &ResultStore) -> StepInputs {
        let mut inputs = StepInputs::new(step.descriptor.id().clone());
        for consume in step.descriptor.consumes() {
            if consume.requirement.carries_data() {
                inputs.declare(consume.item, store.values(&consume.item));
            }
        }
        inputs
    }

    /// Execute every step of one wave and wait for all of them.
    ///
    /// Returns the outputs of each step in wave order, or every failure seen
    /// in the wave.
    async fn execute_wave(
        &self,
        wave: usize,
        steps: &[usize],
        chain: &BuildChain,
        store: &ResultStore,
        semaphore: &Arc<Semaphore>,
    ) -> Result<Vec<(usize, StepOutputs)>, BuildError> {
        let mut tasks = Vec::with_capacity(steps.len());

        for &index in steps {
            let step = &chain.chain_steps()[index];
            let inputs = Self::collect_inputs(step, store);
            let descriptor = Arc::clone(&step.descriptor);

            let permit = Arc::clone(semaphore)
                .acquire_owned()
                .await
                .map_err(|e| BuildError::Internal {
                    message: format!(
                        "Failed to acquire worker permit for step '{}': {}",
                        descriptor.id(),
                        e
                    ),
                })?;

            let task = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let start_msg = StepStarted {
                    step_id: descriptor.id().as_str(),
                    wave,
                    input_items: inputs.declared_count(),
                };
                let span = start_msg.span("step_execution");
                let _guard = span.enter();
                start_msg.log();

                let started = Instant::now();
                let outputs = descriptor.action().execute(&inputs)?;

                StepCompleted {
                    step_id: descriptor.id().as_str(),
                    produced: outputs.len(),
                    duration: started.elapsed(),
                }
                .log();
                Ok::<StepOutputs, anyhow::Error>(outputs)
            });

            tasks.push((index, task));
        }

        let mut completed = Vec::with_capacity(tasks.len());
        let mut causes = Vec::new();

        // Wait for every task so a failure never interrupts a running sibling
        for (index, task) in tasks {
            let step = &chain.chain_steps()[index];
            let step_id = step.descriptor.id().clone();

            let outcome = match task.await {
                Ok(Ok(outputs)) => Self::check_production(step, &outputs).map(|()| outputs),
                Ok(Err(error)) => Err(StepFailure::failed(step_id, &error)),
                Err(join_error) => Err(StepFailure::panicked(step_id, panic_message(join_error))),
            };

            match outcome {
                Ok(outputs) => completed.push((index, outputs)),
                Err(failure) => {
                    StepFailed {
                        step_id: failure.step.as_str(),
                        error: &failure.to_string(),
                    }
                    .log();
                    causes.push(failure);
                }
            }
        }

        if causes.is_empty() {
            Ok(completed)
        } else {
            Err(BuildFailure { wave, causes }.into())
        }
    }

    /// A step may only produce items it declared as real productions, and a
    /// `Single` item at most once.
    fn check_production(step: &ChainStep, outputs: &StepOutputs) -> Result<(), StepFailure> {
        let mut singles = HashSet::new();
        for item in outputs.items() {
            let declared = step
                .descriptor
                .production_of(item)
                .map(|produce| produce.is_real())
                .unwrap_or(false);
            if !declared {
                return Err(StepFailure::invalid_production(
                    step.descriptor.id().clone(),
                    format!("produced undeclared item {}", item),
                ));
            }
            if item.is_single() && !singles.insert(*item) {
                return Err(StepFailure::invalid_production(
                    step.descriptor.id().clone(),
                    format!("produced single item {} more than once", item),
                ));
            }
        }
        Ok(())
    }

    /// Merge one step's outputs, dropping values of items it produces overridably
    /// while a regular producer is kept. Returns the number of merged values.
    fn merge_outputs(
        step: &ChainStep,
        outputs: StepOutputs,
        store: &mut ResultStore,
    ) -> Result<usize, BuildError> {
        let mut merged = 0;
        for (item, value) in outputs.into_values() {
            if step.overridden.contains(&item) {
                OverriddenValueDiscarded {
                    step_id: step.descriptor.id().as_str(),
                    item: item.name(),
                }
                .log();
                continue;
            }
            store.insert(item, step_order(step.registration), value)?;
            merged += 1;
        }
        Ok(merged)
    }

    async fn run_waves(
        &self,
        chain: &BuildChain,
        initial: InitialItems,
    ) -> Result<BuildResult, BuildError> {
        let started = Instant::now();
        let mut store = Self::seed_store(chain, initial)?;
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut executed = Vec::with_capacity(chain.step_count());

        for (wave, steps) in chain.wave_indices().iter().enumerate() {
            let wave_started = Instant::now();
            WaveStarted {
                wave,
                step_count: steps.len(),
            }
            .log();

            let completed = self
                .execute_wave(wave, steps, chain, &store, &semaphore)
                .await?;

            let mut merged_values = 0;
            for (index, outputs) in completed {
                let step = &chain.chain_steps()[index];
                merged_values += Self::merge_outputs(step, outputs, &mut store)?;
                executed.push(step.descriptor.id().clone());
            }

            WaveCompleted {
                wave,
                step_count: steps.len(),
                merged_values,
                duration: wave_started.elapsed(),
            }
            .log();
        }

        Ok(BuildResult::new(
            store,
            executed,
            chain.wave_count(),
            started.elapsed(),
        ))
    }
}

impl Default for WaveExecutor {
    /// Concurrency defaults to the number of available cores.
    fn default() -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_MAX_CONCURRENCY);
        Self::new(concurrency)
    }
}

#[async_trait]
impl BuildExecutor for WaveExecutor {
    async fn execute(
        &self,
        chain: &BuildChain,
        initial: InitialItems,
    ) -> Result<BuildResult, BuildError> {
        let start_msg = ExecutionStarted {
            strategy: STRATEGY,
            step_count: chain.step_count(),
            wave_count: chain.wave_count(),
            max_concurrency: self.max_concurrency,
        };
        let span = start_msg.span("build_execution");
        span.in_scope(|| start_msg.log());

        let result = self.run_waves(chain, initial).instrument(span.clone()).await;

        span.in_scope(|| match &result {
            Ok(build) => ExecutionCompleted {
                strategy: STRATEGY,
                step_count: build.executed_steps().len(),
                item_count: build.item_count(),
                duration: build.duration(),
            }
            .log(),
            Err(error) => ExecutionFailed {
                strategy: STRATEGY,
                error,
            }
            .log(),
        });
        result
    }

    fn strategy(&self) -> &'static str {
        STRATEGY
    }
}

fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "step action panicked".to_string()
    }
}

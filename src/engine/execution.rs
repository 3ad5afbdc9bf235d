// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::chain::{BuildChain, BuildItem, ItemId, ItemValue};
use crate::engine::{BuildResult, WaveExecutor};
use crate::errors::BuildError;
use crate::traits::BuildExecutor;

/// Values the caller supplies for a chain's initial items.
#[derive(Debug, Default)]
pub struct InitialItems {
    values: Vec<(ItemId, ItemValue)>,
}

impl InitialItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provide<T: BuildItem>(&mut self, value: T) -> &mut Self {
        self.values.push((ItemId::of::<T>(), Arc::new(value)));
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn into_values(self) -> Vec<(ItemId, ItemValue)> {
        self.values
    }
}

/// One pending run of a [`BuildChain`].
///
/// # Example
/// ```no_run
/// # async fn example(chain: the_buildchain::chain::BuildChain) -> Result<(), the_buildchain::errors::BuildError> {
/// use the_buildchain::chain::{BuildItem, Cardinality};
///
/// struct LaunchMode(&'static str);
/// impl BuildItem for LaunchMode {
///     const CARDINALITY: Cardinality = Cardinality::Single;
/// }
///
/// let result = chain.execution().provide(LaunchMode("prod")).run().await?;
/// println!("ran {} steps", result.executed_steps().len());
/// # Ok(())
/// # }
/// ```
pub struct ExecutionBuilder<'a> {
    chain: &'a BuildChain,
    initial: InitialItems,
}

impl<'a> ExecutionBuilder<'a> {
    pub(crate) fn new(chain: &'a BuildChain) -> Self {
        Self {
            chain,
            initial: InitialItems::new(),
        }
    }

    pub fn provide<T: BuildItem>(mut self, value: T) -> Self {
        self.initial.provide(value);
        self
    }

    pub async fn run(self) -> Result<BuildResult, BuildError> {
        let executor = WaveExecutor::default();
        executor.execute(self.chain, self.initial).await
    }

    pub async fn run_with(self, executor: &dyn BuildExecutor) -> Result<BuildResult, BuildError> {
        executor.execute(self.chain, self.initial).await
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::chain::BuildChain;
use crate::engine::{BuildResult, InitialItems};
use crate::errors::BuildError;

#[async_trait]
pub trait BuildExecutor: Send + Sync {
    /// Execute a built chain once.
    ///
    /// - `chain`: validated, pruned and layered steps
    /// - `initial`: caller-supplied values for the chain's initial items
    ///
    /// Returns a Result containing either:
    /// - Ok(BuildResult): the sealed store of every item produced in this run
    /// - Err(BuildError): why the run stopped; no partial store is exposed
    async fn execute(&self, chain: &BuildChain, initial: InitialItems) -> Result<BuildResult, BuildError>;

    /// Short name used in log messages.
    fn strategy(&self) -> &'static str;
}

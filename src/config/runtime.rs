// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::chain::{BuildChain, ChainBuilder};
use crate::config::EngineConfig;
use crate::engine::WaveExecutor;
use crate::errors::ConfigError;
use crate::traits::BuildExecutor;

/// Build runtime builder - applies configuration to a populated chain builder.
///
/// Steps are registered in code; the configuration decides which items are
/// requested, where the graph is written and how wide the worker pool is.
///
/// # Examples
///
/// ```
/// use the_buildchain::config::{EngineConfig, RuntimeBuilder};
/// use the_buildchain::demo;
///
/// let config = EngineConfig::from_yaml_str("final_items: [ArtifactResult]").unwrap();
/// let (chain, executor) = RuntimeBuilder::from_config(&config, demo::demo_chain().unwrap()).unwrap();
///
/// assert!(chain.step_count() > 0);
/// assert_eq!(executor.strategy(), "waves");
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the chain and its executor from configuration.
    ///
    /// Creates and returns:
    /// - `BuildChain`: the pruned, validated chain for the configured final items
    /// - `Box<dyn BuildExecutor>`: executor sized per `executor_options`
    ///
    /// Final item names are resolved against the item kinds the builder has
    /// seen, so every step must be registered first.
    pub fn from_config(
        cfg: &EngineConfig,
        mut builder: ChainBuilder,
    ) -> Result<(BuildChain, Box<dyn BuildExecutor>), ConfigError> {
        for name in &cfg.final_items {
            builder.request_final_named(name)?;
        }
        if let Some(path) = &cfg.graph_output {
            builder.graph_output(path);
        }

        let chain = builder.build()?;
        let executor: Box<dyn BuildExecutor> = Box::new(WaveExecutor::new(
            cfg.executor_options.resolved_max_concurrency(),
        ));
        Ok((chain, executor))
    }
}

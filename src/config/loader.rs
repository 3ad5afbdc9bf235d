// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_LOG_FILTER, DEFAULT_MAX_CONCURRENCY};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Engine configuration for a build run.
///
/// The step population itself is registered in code; the config only
/// selects what to build and how to run it.
///
/// # Fields
/// * `executor_options` - Worker pool settings (optional)
/// * `graph_output` - File to write the built chain to as DOT (optional)
/// * `final_items` - Item type names to request as build outputs
/// * `logging` - Tracing filter (optional, defaults to `info`)
///
/// # Example
/// ```yaml
/// executor_options:
///   max_concurrency: 4
/// graph_output: target/build-chain.dot
/// final_items:
///   - ArtifactResult
///   - FeatureBuildItem
/// logging:
///   filter: "the_buildchain=debug"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub graph_output: Option<PathBuf>,
    #[serde(default)]
    pub final_items: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_yaml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.executor_options.max_concurrency == Some(0) {
            return Err(ConfigError::Invalid {
                message: "executor_options.max_concurrency must be at least 1".to_string(),
            });
        }
        if self.final_items.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                message: "final_items must not contain empty names".to_string(),
            });
        }
        Ok(())
    }
}

/// Executor-specific configuration options.
///
/// # Fields
/// * `max_concurrency` - Maximum number of step actions running at once (optional)
#[derive(Debug, Default, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

impl ExecutorOptions {
    /// Configured concurrency, or the number of available cores.
    pub fn resolved_max_concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(DEFAULT_MAX_CONCURRENCY)
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Load a config from a YAML (`.yaml`, `.yml`) or TOML (`.toml`) file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => EngineConfig::from_yaml_str(&content),
        Some("toml") => EngineConfig::from_toml_str(&content),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

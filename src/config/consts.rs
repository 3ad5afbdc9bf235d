// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Worker pool size when the number of cores cannot be determined
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
/// Tracing filter used when neither the config nor `RUST_LOG` sets one
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Environment variable naming a file to write the built chain to as DOT
pub const GRAPH_OUTPUT_ENV: &str = "BUILDCHAIN_GRAPH_OUTPUT";

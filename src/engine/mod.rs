// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod execution;
mod result;
mod store;
pub mod wave;

#[cfg(test)]
mod integration_tests;

pub use execution::{ExecutionBuilder, InitialItems};
pub use result::BuildResult;
pub use store::Lookup;
pub use wave::WaveExecutor;

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod chain;
mod config;
mod declaration;
mod execution;

pub use chain::{ChainBuildError, CyclicDependencyError, UnsatisfiedDependencyError};
pub use config::ConfigError;
pub use declaration::{DeclarationError, DeclarationReason};
pub use execution::{BuildError, BuildFailure, InputError, StepFailure, StepFailureKind};

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod executor;
pub mod step_action;

pub use executor::BuildExecutor;
pub use step_action::StepAction;

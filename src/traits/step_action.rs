// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::chain::{StepInputs, StepOutputs};

/// The unit of work stored in a step descriptor.
///
/// Actions are synchronous and see nothing but their consumed values. Any
/// closure of the form `Fn(&StepInputs) -> anyhow::Result<StepOutputs>` is an
/// action.
pub trait StepAction: Send + Sync {
    fn execute(&self, inputs: &StepInputs) -> anyhow::Result<StepOutputs>;
}

impl<F> StepAction for F
where
    F: Fn(&StepInputs) -> anyhow::Result<StepOutputs> + Send + Sync,
{
    fn execute(&self, inputs: &StepInputs) -> anyhow::Result<StepOutputs> {
        self(inputs)
    }
}

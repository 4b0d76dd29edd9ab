// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `StartupStep` contract: a unit of install/teardown work.

use async_trait::async_trait;
use thiserror::Error;

use crate::context::PartitionContext;

/// Failure kinds a step's `open` can report.
///
/// `Unrecoverable` is a marker, not a severity level: it tells the
/// supervisor "do not attempt recovery on this node", independent of how
/// serious the underlying cause looks. Everything else is `Transient`
/// and routes through the recoverable-failure path.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{step}: {message}")]
    Transient { step: String, message: String },

    #[error("{step}: unrecoverable: {message}")]
    Unrecoverable { step: String, message: String },
}

impl StepError {
    pub fn transient(step: impl Into<String>, message: impl Into<String>) -> Self {
        StepError::Transient {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn unrecoverable(step: impl Into<String>, message: impl Into<String>) -> Self {
        StepError::Unrecoverable {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, StepError::Unrecoverable { .. })
    }

    pub fn step_name(&self) -> &str {
        match self {
            StepError::Transient { step, .. } => step,
            StepError::Unrecoverable { step, .. } => step,
        }
    }
}

/// A unit of install/teardown work run by a [`StartupProcess`](../struct.StartupProcess.html)
/// (defined in `partition-runtime`).
///
/// Implementer contract: a step must tolerate `open` being called at
/// most once between `close` calls, and `close` must be
/// safe to call on a partially opened step (e.g. `open` failed halfway
/// through populating handles).
#[async_trait]
pub trait StartupStep: Send + Sync {
    /// Stable name used in logs and error messages.
    fn name(&self) -> &str;

    /// Install this step, possibly populating handles on `context`.
    async fn open(&self, context: &mut PartitionContext) -> Result<(), StepError>;

    /// Tear down this step, reversing whatever `open` did. Must be safe
    /// to call even if `open` never completed successfully.
    async fn close(&self, context: &mut PartitionContext) -> Result<(), StepError>;
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;

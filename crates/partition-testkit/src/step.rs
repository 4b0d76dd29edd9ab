// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use partition_core::{PartitionContext, StartupStep, StepError};

/// A queued `open`/`close` outcome for [`ScriptedStep`].
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    Success,
    Transient(String),
    Unrecoverable(String),
}

struct Inner {
    open_outcomes: Vec<ScriptedOutcome>,
    close_outcomes: Vec<ScriptedOutcome>,
    calls: Vec<String>,
}

/// A `StartupStep` whose `open`/`close` results are scripted in advance,
/// with every call recorded to a log. Each call consumes the next
/// queued outcome for that method; `Success` is used once the queue is
/// empty.
#[derive(Clone)]
pub struct ScriptedStep {
    name: String,
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Arc::new(Mutex::new(Inner {
                open_outcomes: Vec::new(),
                close_outcomes: Vec::new(),
                calls: Vec::new(),
            })),
        }
    }

    pub fn with_open_outcomes(self, outcomes: Vec<ScriptedOutcome>) -> Self {
        self.inner.lock().open_outcomes = outcomes;
        self
    }

    pub fn with_close_outcomes(self, outcomes: Vec<ScriptedOutcome>) -> Self {
        self.inner.lock().close_outcomes = outcomes;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }

    fn resolve(outcome: Option<ScriptedOutcome>, name: &str) -> Result<(), StepError> {
        match outcome.unwrap_or(ScriptedOutcome::Success) {
            ScriptedOutcome::Success => Ok(()),
            ScriptedOutcome::Transient(message) => Err(StepError::transient(name, message)),
            ScriptedOutcome::Unrecoverable(message) => Err(StepError::unrecoverable(name, message)),
        }
    }
}

#[async_trait]
impl StartupStep for ScriptedStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(&self, _context: &mut PartitionContext) -> Result<(), StepError> {
        let mut inner = self.inner.lock();
        inner.calls.push(format!("open:{}", self.name));
        let outcome = if inner.open_outcomes.is_empty() {
            None
        } else {
            Some(inner.open_outcomes.remove(0))
        };
        drop(inner);
        Self::resolve(outcome, &self.name)
    }

    async fn close(&self, _context: &mut PartitionContext) -> Result<(), StepError> {
        let mut inner = self.inner.lock();
        inner.calls.push(format!("close:{}", self.name));
        let outcome = if inner.close_outcomes.is_empty() {
            None
        } else {
            Some(inner.close_outcomes.remove(0))
        };
        drop(inner);
        Self::resolve(outcome, &self.name)
    }
}

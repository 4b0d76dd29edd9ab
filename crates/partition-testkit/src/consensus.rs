// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use partition_core::{ConsensusClient, ConsensusRequestError};

/// A recorded `ConsensusClient` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusCall {
    StepDown,
    GoInactive,
}

struct Inner {
    calls: Vec<ConsensusCall>,
    fail_step_down: bool,
    fail_go_inactive: bool,
}

/// Records every `step_down`/`go_inactive` request, optionally configured
/// to fail either one.
#[derive(Clone)]
pub struct FakeConsensusClient {
    inner: Arc<Mutex<Inner>>,
}

impl Default for FakeConsensusClient {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                calls: Vec::new(),
                fail_step_down: false,
                fail_go_inactive: false,
            })),
        }
    }
}

impl FakeConsensusClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_step_down(&self) {
        self.inner.lock().fail_step_down = true;
    }

    pub fn fail_go_inactive(&self) {
        self.inner.lock().fail_go_inactive = true;
    }

    pub fn calls(&self) -> Vec<ConsensusCall> {
        self.inner.lock().calls.clone()
    }

    pub fn step_down_count(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| **c == ConsensusCall::StepDown).count()
    }

    pub fn go_inactive_count(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| **c == ConsensusCall::GoInactive).count()
    }
}

#[async_trait]
impl ConsensusClient for FakeConsensusClient {
    async fn step_down(&self) -> Result<(), ConsensusRequestError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ConsensusCall::StepDown);
        if inner.fail_step_down {
            Err(ConsensusRequestError::new("step_down rejected"))
        } else {
            Ok(())
        }
    }

    async fn go_inactive(&self) -> Result<(), ConsensusRequestError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ConsensusCall::GoInactive);
        if inner.fail_go_inactive {
            Err(ConsensusRequestError::new("go_inactive rejected"))
        } else {
            Ok(())
        }
    }
}

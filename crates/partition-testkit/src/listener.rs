// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use partition_core::{ListenerError, LogStream, PartitionId, PartitionListener, Term};

/// A recorded `PartitionListener` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleEvent {
    Leader(Term),
    Follower(Term),
    Inactive(Term),
}

/// Records every `on_becoming_*` call in arrival order.
#[derive(Default, Clone)]
pub struct RecordingPartitionListener {
    events: Arc<Mutex<Vec<RoleEvent>>>,
}

impl RecordingPartitionListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RoleEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl PartitionListener for RecordingPartitionListener {
    async fn on_becoming_leader(&self, _partition_id: PartitionId, term: Term, _log_stream: Arc<dyn LogStream>) -> Result<(), ListenerError> {
        self.events.lock().push(RoleEvent::Leader(term));
        Ok(())
    }

    async fn on_becoming_follower(&self, _partition_id: PartitionId, term: Term) -> Result<(), ListenerError> {
        self.events.lock().push(RoleEvent::Follower(term));
        Ok(())
    }

    async fn on_becoming_inactive(&self, _partition_id: PartitionId, term: Term) -> Result<(), ListenerError> {
        self.events.lock().push(RoleEvent::Inactive(term));
        Ok(())
    }
}

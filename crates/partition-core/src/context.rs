// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mutable state bag a supervisor's actor owns exclusively.

use std::sync::Arc;

use crate::handles::Handles;
use crate::ids::{NodeId, PartitionId, Term};
use crate::listener::PartitionListener;
use crate::role::Role;

/// Accessible only from the supervisor's executor. Nothing in this
/// crate enforces that at the type level (the actor is what
/// enforces it, in `partition-runtime`) — `PartitionContext` itself is a
/// plain, unsynchronized struct, the same way a single event loop's
/// materialized state is a plain struct with no internal locking of
/// its own.
pub struct PartitionContext {
    pub partition_id: PartitionId,
    pub node_id: NodeId,
    pub current_role: Role,
    pub current_term: Term,
    pub disk_space_available: bool,
    pub processing_paused: bool,
    pub exporting_paused: bool,
    pub handles: Handles,
    pub listeners: Vec<Arc<dyn PartitionListener>>,
}

impl PartitionContext {
    pub fn new(partition_id: PartitionId, node_id: NodeId) -> Self {
        Self {
            partition_id,
            node_id,
            current_role: Role::Inactive,
            current_term: Term::ZERO,
            disk_space_available: true,
            processing_paused: false,
            exporting_paused: false,
            handles: Handles::default(),
            listeners: Vec::new(),
        }
    }

    /// Invariant check: at any quiescent instant, the handles present
    /// must match the role. Leaders install everything; followers
    /// install a reduced set (no exporter, no snapshot director); inactive
    /// installs nothing.
    pub fn handles_match_role(&self) -> bool {
        match self.current_role {
            Role::Inactive => self.handles.is_empty(),
            Role::Follower | Role::Candidate => {
                self.handles.log_stream.is_some()
                    && self.handles.stream_processor.is_some()
                    && self.handles.exporter_director.is_none()
                    && self.handles.snapshot_director.is_none()
            }
            Role::Leader => {
                self.handles.log_stream.is_some()
                    && self.handles.stream_processor.is_some()
                    && self.handles.exporter_director.is_some()
                    && self.handles.snapshot_director.is_some()
            }
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn PartitionListener>) {
        self.listeners.push(listener);
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

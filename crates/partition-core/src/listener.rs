// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External observer and consensus-collaborator traits.

use async_trait::async_trait;

use crate::handles::LogStream;
use crate::ids::{PartitionId, Term};

/// External observer of role changes, notified after a successful
/// transition (or on the way to `Inactive` during failure handling).
#[async_trait]
pub trait PartitionListener: Send + Sync {
    async fn on_becoming_leader(
        &self,
        partition_id: PartitionId,
        term: Term,
        log_stream: std::sync::Arc<dyn LogStream>,
    ) -> Result<(), ListenerError>;

    async fn on_becoming_follower(
        &self,
        partition_id: PartitionId,
        term: Term,
    ) -> Result<(), ListenerError>;

    async fn on_becoming_inactive(
        &self,
        partition_id: PartitionId,
        term: Term,
    ) -> Result<(), ListenerError>;
}

/// A listener future failing is treated as a transition install failure.
/// Carries no taxonomy of its own — the supervisor folds any
/// `ListenerError` into its transition-failure classification.
#[derive(Debug, thiserror::Error)]
#[error("partition listener failed: {0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        ListenerError(message.into())
    }
}

/// The consensus module's half of the contract: it emits role events
/// (consumed elsewhere, via `PartitionSupervisor::on_new_role`) and
/// accepts these two requests.
#[async_trait]
pub trait ConsensusClient: Send + Sync {
    /// Ask consensus to step this replica down from leader. Consensus
    /// will subsequently emit a follower role-change.
    async fn step_down(&self) -> Result<(), ConsensusRequestError>;

    /// Ask consensus to transition this replica to inactive.
    async fn go_inactive(&self) -> Result<(), ConsensusRequestError>;
}

#[derive(Debug, thiserror::Error)]
#[error("consensus request failed: {0}")]
pub struct ConsensusRequestError(pub String);

impl ConsensusRequestError {
    pub fn new(message: impl Into<String>) -> Self {
        ConsensusRequestError(message.into())
    }
}

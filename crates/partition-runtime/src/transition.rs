// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role transition state machine.

use partition_core::{ListenerError, PartitionContext, Role, Term};
use thiserror::Error;
use tracing::{info, warn};

use crate::startup::{StartupError, StartupProcess};

/// Errors from [`PartitionTransitionEngine`].
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("install failed: {0}")]
    Install(#[from] StartupError),
    #[error("listener rejected the transition: {0}")]
    Listener(#[from] ListenerError),
    #[error("leader install completed without installing a log stream handle")]
    MissingLogStream,
}

/// Drives `PartitionContext::current_role`/`current_term` through the
/// leader/follower/inactive install processes and notifies listeners
/// afterward.
///
/// Holds one [`StartupProcess`] per non-inactive role; "becoming inactive"
/// is modeled as tearing down whichever of the two is currently open —
/// the inactive process itself is always empty.
pub struct PartitionTransitionEngine {
    leader: StartupProcess,
    follower: StartupProcess,
}

impl PartitionTransitionEngine {
    pub fn new(leader: StartupProcess, follower: StartupProcess) -> Self {
        Self { leader, follower }
    }

    /// Close whichever of leader/follower is open, independent of target
    /// role, then open the target's process, then notify listeners.
    async fn retarget(&mut self, context: &mut PartitionContext, target: Role) -> Result<(), TransitionError> {
        if self.leader.is_open() {
            self.leader.shutdown(context).await?;
        }
        if self.follower.is_open() {
            self.follower.shutdown(context).await?;
        }
        match target {
            Role::Leader => self.leader.startup(context).await?,
            Role::Follower | Role::Candidate => self.follower.startup(context).await?,
            Role::Inactive => {}
        }
        context.current_role = target;
        Ok(())
    }

    pub async fn to_leader(&mut self, context: &mut PartitionContext, term: Term) -> Result<(), TransitionError> {
        self.retarget(context, Role::Leader).await?;
        context.current_term = term;
        info!(partition = %context.partition_id, %term, "became leader");
        let log_stream = context
            .handles
            .log_stream
            .clone()
            .ok_or(TransitionError::MissingLogStream)?;
        for listener in context.listeners.clone() {
            if let Err(err) = listener
                .on_becoming_leader(context.partition_id, term, log_stream.clone())
                .await
            {
                warn!(error = %err, "listener rejected becoming-leader notification");
                return Err(TransitionError::Listener(err));
            }
        }
        Ok(())
    }

    pub async fn to_follower(&mut self, context: &mut PartitionContext, term: Term) -> Result<(), TransitionError> {
        self.retarget(context, Role::Follower).await?;
        context.current_term = term;
        info!(partition = %context.partition_id, %term, "became follower");
        for listener in context.listeners.clone() {
            if let Err(err) = listener.on_becoming_follower(context.partition_id, term).await {
                warn!(error = %err, "listener rejected becoming-follower notification");
                return Err(TransitionError::Listener(err));
            }
        }
        Ok(())
    }

    pub async fn to_inactive(&mut self, context: &mut PartitionContext) -> Result<(), TransitionError> {
        self.retarget(context, Role::Inactive).await?;
        let term = context.current_term;
        info!(partition = %context.partition_id, %term, "became inactive");
        for listener in context.listeners.clone() {
            if let Err(err) = listener.on_becoming_inactive(context.partition_id, term).await {
                warn!(error = %err, "listener rejected becoming-inactive notification");
                return Err(TransitionError::Listener(err));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;

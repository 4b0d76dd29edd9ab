// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partition supervisor: role state machine and control surface.

use std::sync::Arc;

use async_trait::async_trait;
use partition_core::{
    ConsensusClient, ConsensusRole, ExporterDirector, FailureListener, HealthMonitorable, HealthStatus, NodeId, PartitionContext,
    PartitionId, PartitionListener, PersistedPauseState, SnapshotDirector, StartupStep, StreamProcessor, Term,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::actor::{Actor, ActorError};
use crate::config::SupervisorConfig;
use crate::health_monitor::HealthMonitor;
use crate::startup::{StartupError, StartupProcess};
use crate::transition::{PartitionTransitionEngine, TransitionError};

/// Errors surfaced by [`PartitionSupervisor`] control operations.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("executor unavailable: {0}")]
    Actor(#[from] ActorError),
    #[error("bootstrap failed: {0}")]
    Bootstrap(#[source] StartupError),
    #[error("close failed while tearing down bootstrap steps: {0}")]
    Close(#[source] StartupError),
}

/// The broader role state machine: `Uninit` exists only before the
/// first role change lands; `Role` (in `partition-core`) has
/// no such state because it only describes what's installed, not
/// whether a role has ever been assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleState {
    Uninit,
    Inactive,
    Follower,
    Leader,
}

#[derive(Debug, Clone, Copy)]
enum AttemptedRole {
    Leader,
    Follower,
    Inactive,
}

/// True if any step failure folded into `err` was reported as
/// unrecoverable: the marker routes unconditionally to the unrecoverable
/// handler, regardless of what else went wrong.
fn is_unrecoverable(err: &TransitionError) -> bool {
    matches!(
        err,
        TransitionError::Install(StartupError::Aggregate(errors)) if errors.iter().any(|e| e.is_unrecoverable())
    )
}

struct SupervisorState {
    context: PartitionContext,
    transition: PartitionTransitionEngine,
    bootstrap_steps: StartupProcess,
    consensus: Arc<dyn ConsensusClient>,
    health_monitor: HealthMonitor,
    pause_state: Arc<dyn PersistedPauseState>,
    role_state: RoleState,
    services_installed: bool,
    disk_paused: bool,
    closing: bool,
    dead: bool,
}

impl SupervisorState {
    async fn on_role_change(&mut self, new_role: ConsensusRole, new_term: Term) {
        if self.closing {
            debug!(?new_role, %new_term, "ignoring role change: supervisor is closing");
            return;
        }
        if self.dead {
            debug!(?new_role, %new_term, "ignoring role change: partition is in an unrecoverable failure state");
            return;
        }
        match new_role {
            ConsensusRole::Leader => {
                if self.role_state != RoleState::Leader {
                    self.attempt_transition(AttemptedRole::Leader, new_term).await;
                }
            }
            ConsensusRole::Inactive => {
                self.attempt_transition(AttemptedRole::Inactive, new_term).await;
            }
            other => {
                if other.is_follower_like() && matches!(self.role_state, RoleState::Uninit | RoleState::Leader) {
                    self.attempt_transition(AttemptedRole::Follower, new_term).await;
                }
            }
        }
    }

    async fn attempt_transition(&mut self, attempted: AttemptedRole, term: Term) {
        let result = match attempted {
            AttemptedRole::Leader => self.transition.to_leader(&mut self.context, term).await,
            AttemptedRole::Follower => self.transition.to_follower(&mut self.context, term).await,
            AttemptedRole::Inactive => self.transition.to_inactive(&mut self.context).await,
        };
        match result {
            Ok(()) => {
                self.role_state = match attempted {
                    AttemptedRole::Leader => RoleState::Leader,
                    AttemptedRole::Follower => RoleState::Follower,
                    AttemptedRole::Inactive => RoleState::Inactive,
                };
                self.services_installed = !matches!(attempted, AttemptedRole::Inactive);
                info!(?attempted, %term, "partition transition settled");
            }
            Err(err) if is_unrecoverable(&err) => {
                error!(?attempted, %term, error = %err, "transition failed with an unrecoverable step error");
                self.handle_unrecoverable_failure().await;
            }
            Err(err) => {
                warn!(?attempted, %term, error = %err, "transition failed, entering recoverable failure handling");
                self.handle_recoverable_failure(attempted).await;
            }
        }
    }

    /// Mark services uninstalled, notify listeners we're now inactive,
    /// then ask consensus to move this replica out of the role whose
    /// install just failed. Under this supervisor's strict
    /// actor-serialized model there is no concurrent role change that
    /// could make the attempted term stale by the time this runs, so a
    /// "term still matches" guard is unnecessary here.
    async fn handle_recoverable_failure(&mut self, attempted: AttemptedRole) {
        self.services_installed = false;
        for listener in self.context.listeners.clone() {
            if let Err(err) = listener
                .on_becoming_inactive(self.context.partition_id, self.context.current_term)
                .await
            {
                warn!(error = %err, "listener rejected becoming-inactive notification during recovery");
            }
        }
        match attempted {
            AttemptedRole::Leader => {
                if let Err(err) = self.consensus.step_down().await {
                    warn!(error = %err, "consensus step_down request failed");
                }
            }
            AttemptedRole::Follower => {
                if let Err(err) = self.consensus.go_inactive().await {
                    warn!(error = %err, "consensus go_inactive request failed");
                }
            }
            AttemptedRole::Inactive => {}
        }
    }

    /// Idempotent: a second call (the install-time path calling directly,
    /// then the health monitor's own broadcast calling back through
    /// `PartitionSupervisor::on_unrecoverable_failure`) is a no-op once
    /// `dead` is already set.
    async fn handle_unrecoverable_failure(&mut self) {
        if self.dead {
            return;
        }
        self.dead = true;
        if let Err(err) = self.transition.to_inactive(&mut self.context).await {
            warn!(error = %err, "to_inactive during unrecoverable handling reported an error; continuing");
        }
        self.role_state = RoleState::Inactive;
        self.services_installed = false;
        if let Err(err) = self.consensus.go_inactive().await {
            warn!(error = %err, "consensus go_inactive request failed during unrecoverable handling");
        }
        self.health_monitor.report_unrecoverable().await;
    }

    async fn pause_processing(&mut self) {
        self.context.processing_paused = true;
        self.pause_state.save(true, self.context.exporting_paused).await;
        if let Some(sp) = self.context.handles.stream_processor.clone() {
            sp.pause().await;
        }
    }

    async fn resume_processing(&mut self) {
        self.context.processing_paused = false;
        self.pause_state.save(false, self.context.exporting_paused).await;
        if self.context.disk_space_available {
            if let Some(sp) = self.context.handles.stream_processor.clone() {
                sp.resume().await;
            }
        } else {
            debug!("processing remains paused: disk space unavailable");
        }
    }

    async fn pause_exporting(&mut self) {
        self.context.exporting_paused = true;
        self.pause_state.save(self.context.processing_paused, true).await;
        if let Some(ed) = self.context.handles.exporter_director.clone() {
            ed.pause().await;
        }
    }

    async fn resume_exporting(&mut self) {
        self.context.exporting_paused = false;
        self.pause_state.save(self.context.processing_paused, false).await;
        if let Some(ed) = self.context.handles.exporter_director.clone() {
            ed.resume().await;
        }
    }

    async fn on_disk_space_available(&mut self) {
        self.context.disk_space_available = true;
        if self.disk_paused {
            self.disk_paused = false;
            if !self.context.processing_paused {
                if let Some(sp) = self.context.handles.stream_processor.clone() {
                    sp.resume().await;
                }
            }
        }
    }

    async fn on_disk_space_not_available(&mut self) {
        self.context.disk_space_available = false;
        if !self.disk_paused {
            self.disk_paused = true;
            if let Some(sp) = self.context.handles.stream_processor.clone() {
                sp.pause().await;
            }
        }
    }

    async fn trigger_snapshot(&self) {
        if let Some(sd) = self.context.handles.snapshot_director.clone() {
            sd.trigger_snapshot().await;
        } else {
            debug!("trigger_snapshot requested with no snapshot director installed");
        }
    }

    async fn close(&mut self) -> Result<(), SupervisorError> {
        self.closing = true;
        info!("partition supervisor closing");
        if let Err(err) = self.transition.to_inactive(&mut self.context).await {
            warn!(error = %err, "to_inactive during close reported an error; continuing close");
        }
        self.role_state = RoleState::Inactive;
        self.bootstrap_steps
            .shutdown(&mut self.context)
            .await
            .map_err(SupervisorError::Close)
    }
}

/// Reports `services_installed` to the health monitor as a regular
/// component, so a recoverable install failure (which clears the flag
/// without killing the replica) degrades the aggregate health to
/// `Unhealthy` and a subsequent successful install recovers it, the same
/// way any other monitored child does.
struct ServicesHealthSource {
    actor: Actor<SupervisorState>,
}

#[async_trait]
impl HealthMonitorable for ServicesHealthSource {
    async fn get_health_status(&self) -> HealthStatus {
        self.actor
            .call(|state| Box::pin(async move { state.services_installed }))
            .await
            .map(|installed| if installed { HealthStatus::Healthy } else { HealthStatus::Unhealthy })
            .unwrap_or(HealthStatus::Dead)
    }
}

/// Owns the actor, context, transition engine, and health monitor for one
/// partition replica, and exposes the control surface consensus and the
/// embedder drive it through.
pub struct PartitionSupervisor {
    actor: Actor<SupervisorState>,
    health_monitor: HealthMonitor,
}

impl PartitionSupervisor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        partition_id: PartitionId,
        node_id: NodeId,
        consensus: Arc<dyn ConsensusClient>,
        pause_state: Arc<dyn PersistedPauseState>,
        bootstrap_steps: Vec<Arc<dyn StartupStep>>,
        leader_steps: Vec<Arc<dyn StartupStep>>,
        follower_steps: Vec<Arc<dyn StartupStep>>,
        config: SupervisorConfig,
    ) -> Arc<Self> {
        let health_monitor = HealthMonitor::new(config.health_check_tick);

        let mut leader_process = StartupProcess::new(leader_steps);
        let mut follower_process = StartupProcess::new(follower_steps);
        let mut bootstrap_process = StartupProcess::new(bootstrap_steps);
        if let Some(timeout) = config.step_open_timeout {
            leader_process = leader_process.with_open_timeout(timeout);
            follower_process = follower_process.with_open_timeout(timeout);
            bootstrap_process = bootstrap_process.with_open_timeout(timeout);
        }

        let state = SupervisorState {
            context: PartitionContext::new(partition_id, node_id),
            transition: PartitionTransitionEngine::new(leader_process, follower_process),
            bootstrap_steps: bootstrap_process,
            consensus,
            health_monitor: health_monitor.clone(),
            pause_state,
            role_state: RoleState::Uninit,
            services_installed: false,
            disk_paused: false,
            closing: false,
            dead: false,
        };

        Arc::new(Self {
            actor: Actor::spawn(state),
            health_monitor,
        })
    }

    /// Run bootstrap steps, load persisted pause state, register this
    /// supervisor with its own health monitor, start polling, and drive
    /// the initial role observed from consensus.
    pub async fn bootstrap(self: &Arc<Self>, initial_role: ConsensusRole, initial_term: Term) -> Result<(), SupervisorError> {
        let listener: Arc<dyn FailureListener> = self.clone();
        self.health_monitor.add_failure_listener(listener).await;
        let services_health: Arc<dyn HealthMonitorable> = Arc::new(ServicesHealthSource { actor: self.actor.clone() });
        self.health_monitor.register_component("services", services_health).await;

        let outcome = self
            .actor
            .call(|state| {
                Box::pin(async move {
                    let (processing_paused, exporting_paused) = state.pause_state.load().await;
                    state.context.processing_paused = processing_paused;
                    state.context.exporting_paused = exporting_paused;
                    state.bootstrap_steps.startup(&mut state.context).await
                })
            })
            .await
            .map_err(SupervisorError::Actor)?;
        outcome.map_err(SupervisorError::Bootstrap)?;

        self.health_monitor.start_monitoring();
        self.on_new_role(initial_role, initial_term).await;
        Ok(())
    }

    /// Called by the consensus listener (any thread) on a role change.
    /// Enqueues `on_role_change` onto the actor; does not wait for it to
    /// settle.
    pub async fn on_new_role(&self, new_role: ConsensusRole, new_term: Term) {
        let _ = self
            .actor
            .run(move |state| Box::pin(async move { state.on_role_change(new_role, new_term).await }));
    }

    pub async fn close_async(&self) -> Result<(), SupervisorError> {
        self.actor.call(|state| Box::pin(async move { state.close().await })).await.map_err(SupervisorError::Actor)?
    }

    pub async fn pause_processing(&self) {
        let _ = self.actor.call(|state| Box::pin(async move { state.pause_processing().await })).await;
    }

    pub async fn resume_processing(&self) {
        let _ = self.actor.call(|state| Box::pin(async move { state.resume_processing().await })).await;
    }

    pub async fn pause_exporting(&self) {
        let _ = self.actor.call(|state| Box::pin(async move { state.pause_exporting().await })).await;
    }

    pub async fn resume_exporting(&self) {
        let _ = self.actor.call(|state| Box::pin(async move { state.resume_exporting().await })).await;
    }

    pub async fn trigger_snapshot(&self) {
        let _ = self.actor.call(|state| Box::pin(async move { state.trigger_snapshot().await })).await;
    }

    pub async fn get_stream_processor(&self) -> Option<Arc<dyn StreamProcessor>> {
        self.actor
            .call(|state| Box::pin(async move { state.context.handles.stream_processor.clone() }))
            .await
            .unwrap_or(None)
    }

    pub async fn get_exporter_director(&self) -> Option<Arc<dyn ExporterDirector>> {
        self.actor
            .call(|state| Box::pin(async move { state.context.handles.exporter_director.clone() }))
            .await
            .unwrap_or(None)
    }

    pub async fn on_disk_space_available(&self) {
        let _ = self.actor.call(|state| Box::pin(async move { state.on_disk_space_available().await })).await;
    }

    pub async fn on_disk_space_not_available(&self) {
        let _ = self
            .actor
            .call(|state| Box::pin(async move { state.on_disk_space_not_available().await }))
            .await;
    }

    pub async fn add_failure_listener(&self, listener: Arc<dyn FailureListener>) {
        self.health_monitor.add_failure_listener(listener).await;
    }

    pub async fn remove_failure_listener(&self, listener: &Arc<dyn FailureListener>) {
        self.health_monitor.remove_failure_listener(listener).await;
    }

    /// Sticky `Dead` once an unrecoverable failure has been observed,
    /// regardless of what the monitor's live aggregate later reports.
    pub async fn get_health_status(&self) -> HealthStatus {
        let dead = self.actor.call(|state| Box::pin(async move { state.dead })).await.unwrap_or(true);
        if dead {
            HealthStatus::Dead
        } else {
            self.health_monitor.get_health_status().await
        }
    }
}

#[async_trait]
impl FailureListener for PartitionSupervisor {
    async fn on_failure(&self) {
        debug!("partition supervisor observed a health monitor failure");
    }

    async fn on_recovered(&self) {
        debug!("partition supervisor observed a health monitor recovery");
    }

    async fn on_unrecoverable_failure(&self) {
        let _ = self.actor.run(|state| Box::pin(async move { state.handle_unrecoverable_failure().await }));
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health supervision tree.

use std::sync::Arc;
use std::time::Duration;

use partition_core::{FailureListener, HealthMonitorable, HealthStatus};
use tracing::{debug, info};

use crate::actor::Actor;

struct Component {
    name: String,
    source: Arc<dyn HealthMonitorable>,
    last_status: HealthStatus,
}

struct MonitorState {
    components: Vec<Component>,
    listeners: Vec<Arc<dyn FailureListener>>,
    status: HealthStatus,
}

impl MonitorState {
    fn new() -> Self {
        Self {
            components: Vec::new(),
            listeners: Vec::new(),
            status: HealthStatus::Healthy,
        }
    }

    fn aggregate(&self) -> HealthStatus {
        self.components
            .iter()
            .map(|c| c.last_status)
            .max()
            .unwrap_or(HealthStatus::Healthy)
    }

    async fn notify_edge(&self, previous: HealthStatus, new: HealthStatus) {
        if previous == new {
            return;
        }
        if previous == HealthStatus::Healthy && new != HealthStatus::Healthy {
            info!(from = %previous, to = %new, "health monitor: aggregate status degraded");
            for listener in &self.listeners {
                listener.on_failure().await;
            }
        }
        if previous != HealthStatus::Healthy && new == HealthStatus::Healthy {
            info!(from = %previous, to = %new, "health monitor: aggregate status recovered");
            for listener in &self.listeners {
                listener.on_recovered().await;
            }
        }
        if new == HealthStatus::Dead && previous != HealthStatus::Dead {
            info!("health monitor: aggregate status is now dead (unrecoverable)");
            for listener in &self.listeners {
                listener.on_unrecoverable_failure().await;
            }
        }
    }

    /// Poll every child once, in registration order, then deliver any
    /// edge transitions the new aggregate implies.
    async fn tick(&mut self) {
        for component in &mut self.components {
            component.last_status = component.source.get_health_status().await;
            debug!(component = %component.name, status = %component.last_status, "health poll");
        }
        let previous = self.status;
        let new = self.aggregate();
        self.notify_edge(previous, new).await;
        self.status = new;
    }
}

/// Hierarchical monitor aggregating child component health.
///
/// Owns its own [`Actor`] rather than sharing the supervisor's: the
/// health monitor's component registry is owned by the monitor's own
/// executor.
#[derive(Clone)]
pub struct HealthMonitor {
    actor: Actor<MonitorState>,
    tick: Duration,
}

impl HealthMonitor {
    pub fn new(tick: Duration) -> Self {
        Self {
            actor: Actor::spawn(MonitorState::new()),
            tick,
        }
    }

    /// Idempotent on `name`: re-registering replaces the source in place
    /// rather than creating a duplicate entry.
    pub async fn register_component(&self, name: impl Into<String>, source: Arc<dyn HealthMonitorable>) {
        let name = name.into();
        let _ = self
            .actor
            .call(move |state| {
                Box::pin(async move {
                    if let Some(existing) = state.components.iter_mut().find(|c| c.name == name) {
                        existing.source = source;
                    } else {
                        state.components.push(Component {
                            name,
                            source,
                            last_status: HealthStatus::Healthy,
                        });
                    }
                })
            })
            .await;
    }

    pub async fn remove_component(&self, name: &str) {
        let name = name.to_string();
        let _ = self
            .actor
            .call(move |state| {
                Box::pin(async move {
                    state.components.retain(|c| c.name != name);
                })
            })
            .await;
    }

    /// Listeners added while status ≠ Healthy receive an immediate
    /// `on_failure`; listeners added while Healthy receive an immediate
    /// `on_recovered`.
    pub async fn add_failure_listener(&self, listener: Arc<dyn FailureListener>) {
        let _ = self
            .actor
            .call(move |state| {
                Box::pin(async move {
                    state.listeners.push(Arc::clone(&listener));
                    if state.status == HealthStatus::Healthy {
                        listener.on_recovered().await;
                    } else {
                        listener.on_failure().await;
                    }
                })
            })
            .await;
    }

    pub async fn remove_failure_listener(&self, listener: &Arc<dyn FailureListener>) {
        let target = Arc::clone(listener);
        let _ = self
            .actor
            .call(move |state| {
                Box::pin(async move {
                    state.listeners.retain(|l| !Arc::ptr_eq(l, &target));
                })
            })
            .await;
    }

    pub async fn get_health_status(&self) -> HealthStatus {
        self.actor
            .call(|state| Box::pin(async move { state.status }))
            .await
            .unwrap_or(HealthStatus::Dead)
    }

    /// Begin periodic polling (default tick from `SupervisorConfig`).
    pub fn start_monitoring(&self) -> tokio::task::JoinHandle<()> {
        self.actor
            .schedule_periodic(self.tick, |state| Box::pin(async move { state.tick().await }))
    }

    /// Force the aggregate straight to `Dead` and fire listener callbacks,
    /// independent of child polling. Used when a failure is detected
    /// somewhere other than a routine health tick (e.g. an unrecoverable
    /// step failure during a role transition).
    pub async fn report_unrecoverable(&self) {
        let _ = self
            .actor
            .call(|state| {
                Box::pin(async move {
                    let previous = state.status;
                    state.notify_edge(previous, HealthStatus::Dead).await;
                    state.status = HealthStatus::Dead;
                })
            })
            .await;
    }
}

#[cfg(test)]
#[path = "health_monitor_tests.rs"]
mod tests;

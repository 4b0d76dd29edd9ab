// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health status and the trait components expose it through.

use async_trait::async_trait;

/// Totally ordered health status. `Dead` is the worst status; derived
/// `Ord` gives us the aggregation rule almost for free: the aggregate of
/// a set of children is simply `children.iter().max()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Dead,
}

impl Default for HealthStatus {
    fn default() -> Self {
        HealthStatus::Healthy
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Dead => "dead",
        };
        write!(f, "{s}")
    }
}

/// Anything the health monitor can poll for status.
///
/// Implemented by every registered child component. Polling must be
/// non-blocking.
#[async_trait]
pub trait HealthMonitorable: Send + Sync {
    async fn get_health_status(&self) -> HealthStatus;
}

/// Observer of aggregate health-status transitions.
///
/// `on_failure` fires on Healthy→(Unhealthy|Dead), `on_recovered` fires
/// on (Unhealthy|Dead)→Healthy, and `on_unrecoverable_failure` fires the
/// instant any child reports `Dead`. All three fire at most once per
/// edge.
#[async_trait]
pub trait FailureListener: Send + Sync {
    async fn on_failure(&self);
    async fn on_recovered(&self);
    async fn on_unrecoverable_failure(&self);
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;

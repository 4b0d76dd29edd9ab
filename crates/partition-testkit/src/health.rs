// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use partition_core::{FailureListener, HealthMonitorable, HealthStatus};

/// A `HealthMonitorable` whose status is set directly by a test.
#[derive(Clone)]
pub struct ManualHealthSource {
    status: Arc<Mutex<HealthStatus>>,
}

impl Default for ManualHealthSource {
    fn default() -> Self {
        Self {
            status: Arc::new(Mutex::new(HealthStatus::Healthy)),
        }
    }
}

impl ManualHealthSource {
    pub fn new(status: HealthStatus) -> Self {
        Self {
            status: Arc::new(Mutex::new(status)),
        }
    }

    pub fn set(&self, status: HealthStatus) {
        *self.status.lock() = status;
    }
}

#[async_trait]
impl HealthMonitorable for ManualHealthSource {
    async fn get_health_status(&self) -> HealthStatus {
        *self.status.lock()
    }
}

/// A recorded `FailureListener` callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureEvent {
    Failure,
    Recovered,
    Unrecoverable,
}

/// Records every health-monitor callback in arrival order.
#[derive(Default, Clone)]
pub struct RecordingFailureListener {
    events: Arc<Mutex<Vec<FailureEvent>>>,
}

impl RecordingFailureListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FailureEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl FailureListener for RecordingFailureListener {
    async fn on_failure(&self) {
        self.events.lock().push(FailureEvent::Failure);
    }

    async fn on_recovered(&self) {
        self.events.lock().push(FailureEvent::Recovered);
    }

    async fn on_unrecoverable_failure(&self) {
        self.events.lock().push(FailureEvent::Unrecoverable);
    }
}

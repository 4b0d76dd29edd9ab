// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration options.

use std::time::Duration;

/// A plain struct rather than a TOML/env-loaded config — this crate is
/// a library, so loading from a file is the embedder's job.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Period between health polls. Default 1 second.
    pub health_check_tick: Duration,
    /// Optional per-step timeout for `StartupStep::open`. Default: none
    /// (relies on the step's own behavior).
    pub step_open_timeout: Option<Duration>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            health_check_tick: Duration::from_secs(1),
            step_open_timeout: None,
        }
    }
}

impl SupervisorConfig {
    pub fn with_health_check_tick(mut self, tick: Duration) -> Self {
        self.health_check_tick = tick;
        self
    }

    pub fn with_step_open_timeout(mut self, timeout: Duration) -> Self {
        self.step_open_timeout = Some(timeout);
        self
    }
}

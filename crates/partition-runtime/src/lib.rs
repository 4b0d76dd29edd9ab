// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! partition-runtime: the executor, health monitor, startup process,
//! transition engine, and supervisor that give `partition-core`'s data
//! model its behavior.

pub mod actor;
pub mod config;
pub mod health_monitor;
pub mod startup;
pub mod supervisor;
pub mod transition;

pub use actor::{Actor, ActorError, BoxFuture};
pub use config::SupervisorConfig;
pub use health_monitor::HealthMonitor;
pub use startup::{ShutdownSignal, StartupError, StartupProcess};
pub use supervisor::{PartitionSupervisor, SupervisorError};
pub use transition::{PartitionTransitionEngine, TransitionError};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Test doubles for `partition-core`'s collaborator traits, in the style
//! of `oj-adapters`'s fake session/agent adapters: each fake wraps its
//! recorded state behind `Arc<parking_lot::Mutex<_>>` so a cheaply
//! cloneable handle can be asserted against after being moved into a
//! supervisor under test.

mod consensus;
mod health;
mod listener;
mod step;

pub use consensus::{ConsensusCall, FakeConsensusClient};
pub use health::{FailureEvent, ManualHealthSource, RecordingFailureListener};
pub use listener::{RecordingPartitionListener, RoleEvent};
pub use step::{ScriptedOutcome, ScriptedStep};

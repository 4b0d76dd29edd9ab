// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered install/teardown state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use partition_core::{PartitionContext, StartupStep, StepError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from [`StartupProcess`].
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("startup already in progress or complete")]
    AlreadyStarted,
    #[error("no startup in progress")]
    NotStarted,
    #[error("startup aborted: shutdown was requested before every step opened")]
    AbortedByShutdown,
    /// Carries every step failure observed while opening or closing,
    /// completing exceptionally with an aggregate carrying all of them
    /// as suppressed causes.
    #[error("{} step(s) failed: {}", .0.len(), summarize(.0))]
    Aggregate(Vec<StepError>),
}

/// A cheap, cloneable handle that can request an in-flight [`StartupProcess::startup`]
/// abort before it opens its next step.
///
/// Deliberately decoupled from `&mut StartupProcess`: the process itself is
/// only ever touched by one exclusive owner at a time, but a shutdown
/// request needs to reach it while `startup` is still awaiting a step's
/// `open`, which a plain `&mut self` method could never observe until that
/// await resolves. Backing it with its own `Arc<AtomicBool>` lets the
/// request land immediately, independent of whatever `startup` happens to
/// be doing.
#[derive(Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    /// Request that the next `startup` step check sees an abort.
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

fn summarize(errors: &[StepError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Runs a fixed, ordered list of [`StartupStep`]s against one
/// [`PartitionContext`], opening front-to-back and closing back-to-front
/// (LIFO teardown).
///
/// Not internally synchronized: a `StartupProcess` is only ever touched
/// from within the actor closure of whichever supervisor owns it, the
/// same "single mutator" pattern `PartitionContext` itself relies on.
/// `PartitionTransitionEngine` owns one instance per role.
pub struct StartupProcess {
    steps: Vec<Arc<dyn StartupStep>>,
    opened: Vec<Arc<dyn StartupStep>>,
    in_progress: bool,
    open_timeout: Option<Duration>,
    shutdown_signal: ShutdownSignal,
}

impl StartupProcess {
    pub fn new(steps: Vec<Arc<dyn StartupStep>>) -> Self {
        Self::with_shutdown_signal(steps, ShutdownSignal::default())
    }

    /// Same as [`StartupProcess::new`], but shares the given signal
    /// instead of minting a fresh one — lets a caller hold the handle
    /// that will request shutdown before the process exists.
    pub fn with_shutdown_signal(steps: Vec<Arc<dyn StartupStep>>, shutdown_signal: ShutdownSignal) -> Self {
        Self {
            steps,
            opened: Vec::new(),
            in_progress: false,
            open_timeout: None,
            shutdown_signal,
        }
    }

    /// Bound how long a single step's `open` may run. A step that
    /// exceeds it fails transiently.
    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = Some(timeout);
        self
    }

    /// A cloneable handle that can request this process abort before its
    /// next step opens, even while the current step's `open` is in flight.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown_signal.clone()
    }

    /// Open every step in order, checking for a pending shutdown request
    /// before opening each one. On the first open failure, close whatever
    /// already opened (LIFO) and return an aggregate carrying the open
    /// failure plus any teardown failures. If a shutdown lands between two
    /// steps, abort immediately without opening the remaining ones — the
    /// steps already opened stay open until a real `shutdown` tears them
    /// down.
    pub async fn startup(&mut self, context: &mut PartitionContext) -> Result<(), StartupError> {
        if self.in_progress || !self.opened.is_empty() {
            return Err(StartupError::AlreadyStarted);
        }
        self.in_progress = true;
        self.shutdown_signal.0.store(false, Ordering::SeqCst);
        let mut errors = Vec::new();
        for step in self.steps.clone() {
            if self.shutdown_signal.is_set() {
                info!(step = step.name(), "startup aborted by a pending shutdown before this step opened");
                self.in_progress = false;
                return Err(StartupError::AbortedByShutdown);
            }
            debug!(step = step.name(), "opening startup step");
            // Pushed before `open` runs, not after: a step whose `open`
            // partially populates handles and then fails must still have
            // `close` called on it during teardown.
            self.opened.push(step.clone());
            let outcome = match self.open_timeout {
                Some(timeout) => match tokio::time::timeout(timeout, step.open(context)).await {
                    Ok(result) => result,
                    Err(_) => Err(StepError::transient(step.name(), "open timed out")),
                },
                None => step.open(context).await,
            };
            match outcome {
                Ok(()) => {
                    info!(step = step.name(), "startup step opened");
                }
                Err(err) => {
                    warn!(step = step.name(), error = %err, "startup step failed to open");
                    errors.push(err);
                    break;
                }
            }
        }
        if !errors.is_empty() {
            while let Some(step) = self.opened.pop() {
                if let Err(close_err) = step.close(context).await {
                    warn!(step = step.name(), error = %close_err, "teardown after failed startup also failed");
                    errors.push(close_err);
                }
            }
            self.in_progress = false;
            return Err(StartupError::Aggregate(errors));
        }
        Ok(())
    }

    /// Close every opened step, LIFO, collecting (not short-circuiting
    /// on) teardown failures. Safe to call after `startup` returned
    /// `AbortedByShutdown`: it tears down exactly the steps recorded in
    /// `opened`, same as after any other partial startup.
    pub async fn shutdown(&mut self, context: &mut PartitionContext) -> Result<(), StartupError> {
        if !self.in_progress && self.opened.is_empty() {
            return Err(StartupError::NotStarted);
        }
        let mut errors = Vec::new();
        while let Some(step) = self.opened.pop() {
            debug!(step = step.name(), "closing startup step");
            if let Err(err) = step.close(context).await {
                warn!(step = step.name(), error = %err, "startup step failed to close");
                errors.push(err);
            } else {
                info!(step = step.name(), "startup step closed");
            }
        }
        self.in_progress = false;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(StartupError::Aggregate(errors))
        }
    }

    pub fn is_open(&self) -> bool {
        !self.opened.is_empty()
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use parking_lot::Mutex;
use partition_core::{NodeId, PartitionId};

struct RecordingStep {
    name: &'static str,
    fail_open: bool,
    fail_close: bool,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl StartupStep for RecordingStep {
    fn name(&self) -> &str {
        self.name
    }

    async fn open(&self, _context: &mut PartitionContext) -> Result<(), StepError> {
        self.log.lock().push(format!("open:{}", self.name));
        if self.fail_open {
            Err(StepError::transient(self.name, "open failed"))
        } else {
            Ok(())
        }
    }

    async fn close(&self, _context: &mut PartitionContext) -> Result<(), StepError> {
        self.log.lock().push(format!("close:{}", self.name));
        if self.fail_close {
            Err(StepError::transient(self.name, "close failed"))
        } else {
            Ok(())
        }
    }
}

fn context() -> PartitionContext {
    PartitionContext::new(PartitionId::new(1), NodeId::new(1))
}

fn step(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn StartupStep> {
    Arc::new(RecordingStep {
        name,
        fail_open: false,
        fail_close: false,
        log: log.clone(),
    })
}

#[tokio::test]
async fn startup_opens_in_order_and_shutdown_closes_in_reverse() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut process = StartupProcess::new(vec![step("a", &log), step("b", &log), step("c", &log)]);
    let mut ctx = context();

    process.startup(&mut ctx).await.unwrap();
    assert!(process.is_open());
    process.shutdown(&mut ctx).await.unwrap();
    assert!(!process.is_open());

    assert_eq!(
        *log.lock(),
        vec!["open:a", "open:b", "open:c", "close:c", "close:b", "close:a"]
    );
}

#[tokio::test]
async fn failed_open_tears_down_only_what_already_opened() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let failing = Arc::new(RecordingStep {
        name: "b",
        fail_open: true,
        fail_close: false,
        log: log.clone(),
    });
    let mut process = StartupProcess::new(vec![step("a", &log), failing, step("c", &log)]);
    let mut ctx = context();

    let err = process.startup(&mut ctx).await.unwrap_err();
    assert!(matches!(err, StartupError::Aggregate(_)));
    // "b" is pushed onto `opened` before its `open` runs, so it gets
    // `close`d during teardown even though its `open` failed.
    assert_eq!(*log.lock(), vec!["open:a", "open:b", "close:b", "close:a"]);
    assert!(!process.is_open());
}

#[tokio::test]
async fn double_startup_is_rejected() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut process = StartupProcess::new(vec![step("a", &log)]);
    let mut ctx = context();
    process.startup(&mut ctx).await.unwrap();
    let err = process.startup(&mut ctx).await.unwrap_err();
    assert!(matches!(err, StartupError::AlreadyStarted));
}

#[tokio::test]
async fn shutdown_without_startup_is_rejected() {
    let mut process = StartupProcess::new(Vec::new());
    let mut ctx = context();
    let err = process.shutdown(&mut ctx).await.unwrap_err();
    assert!(matches!(err, StartupError::NotStarted));
}

#[tokio::test]
async fn shutdown_collects_every_close_failure_without_short_circuiting() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let a = Arc::new(RecordingStep {
        name: "a",
        fail_open: false,
        fail_close: true,
        log: log.clone(),
    });
    let b = Arc::new(RecordingStep {
        name: "b",
        fail_open: false,
        fail_close: true,
        log: log.clone(),
    });
    let mut process = StartupProcess::new(vec![a, b]);
    let mut ctx = context();
    process.startup(&mut ctx).await.unwrap();

    let err = process.shutdown(&mut ctx).await.unwrap_err();
    match err {
        StartupError::Aggregate(errors) => assert_eq!(errors.len(), 2),
        other => panic!("expected Aggregate, got {other:?}"),
    }
    assert_eq!(*log.lock(), vec!["open:a", "open:b", "close:b", "close:a"]);
}

/// A step that, as a side effect of opening, requests shutdown on a
/// signal shared with the process under test — simulating a shutdown
/// request arriving while this step's `open` is in flight.
struct ShutdownRequestingStep {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    signal: ShutdownSignal,
}

#[async_trait]
impl StartupStep for ShutdownRequestingStep {
    fn name(&self) -> &str {
        self.name
    }

    async fn open(&self, _context: &mut PartitionContext) -> Result<(), StepError> {
        self.log.lock().push(format!("open:{}", self.name));
        self.signal.request();
        Ok(())
    }

    async fn close(&self, _context: &mut PartitionContext) -> Result<(), StepError> {
        self.log.lock().push(format!("close:{}", self.name));
        Ok(())
    }
}

#[tokio::test]
async fn shutdown_requested_mid_startup_aborts_before_opening_remaining_steps() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let signal = ShutdownSignal::default();
    let a = Arc::new(ShutdownRequestingStep {
        name: "a",
        log: log.clone(),
        signal: signal.clone(),
    });
    let mut process = StartupProcess::with_shutdown_signal(vec![a, step("b", &log), step("c", &log)], signal);
    let mut ctx = context();

    let err = process.startup(&mut ctx).await.unwrap_err();
    assert!(matches!(err, StartupError::AbortedByShutdown));
    assert_eq!(*log.lock(), vec!["open:a"]);
    assert!(process.is_open());

    process.shutdown(&mut ctx).await.unwrap();
    assert_eq!(*log.lock(), vec!["open:a", "close:a"]);
}

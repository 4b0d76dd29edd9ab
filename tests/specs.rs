//! Cross-crate end-to-end scenarios for the partition lifecycle core.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use partition_core::{
    ConsensusRole, ExporterDirector, HealthStatus, KvStore, LogStream, MessagingService, NodeId, PartitionContext, PartitionId,
    SnapshotDirector, StartupStep, StepError, StreamProcessor, Term,
};
use partition_runtime::{PartitionSupervisor, SupervisorConfig};
use partition_testkit::{ConsensusCall, FakeConsensusClient, RecordingPartitionListener, RoleEvent, ScriptedOutcome, ScriptedStep};

struct NoopLogStream;
impl LogStream for NoopLogStream {}
struct NoopStreamProcessor;
#[async_trait]
impl StreamProcessor for NoopStreamProcessor {
    async fn pause(&self) {}
    async fn resume(&self) {}
}
struct NoopExporter;
#[async_trait]
impl ExporterDirector for NoopExporter {
    async fn pause(&self) {}
    async fn resume(&self) {}
}
struct NoopSnapshot;
#[async_trait]
impl SnapshotDirector for NoopSnapshot {
    async fn trigger_snapshot(&self) {}
}
struct NoopMessaging;
impl MessagingService for NoopMessaging {}
struct NoopKv;
impl KvStore for NoopKv {}

/// Installs every leader handle (or the reduced follower set) once its
/// `open` succeeds; this is what all of `ScriptedStep`'s scripted
/// failures exercise against.
struct HandleInstaller {
    leader: bool,
}

#[async_trait]
impl StartupStep for HandleInstaller {
    fn name(&self) -> &str {
        if self.leader {
            "install-leader-handles"
        } else {
            "install-follower-handles"
        }
    }

    async fn open(&self, context: &mut PartitionContext) -> Result<(), StepError> {
        context.handles.log_stream = Some(Arc::new(NoopLogStream));
        context.handles.stream_processor = Some(Arc::new(NoopStreamProcessor));
        if self.leader {
            context.handles.exporter_director = Some(Arc::new(NoopExporter));
            context.handles.snapshot_director = Some(Arc::new(NoopSnapshot));
            context.handles.messaging_service = Some(Arc::new(NoopMessaging));
            context.handles.kv_store = Some(Arc::new(NoopKv));
        }
        Ok(())
    }

    async fn close(&self, context: &mut PartitionContext) -> Result<(), StepError> {
        context.handles.clear();
        Ok(())
    }
}

fn leader_steps(extra_failing: Option<ScriptedStep>) -> Vec<Arc<dyn StartupStep>> {
    let mut steps: Vec<Arc<dyn StartupStep>> = vec![Arc::new(HandleInstaller { leader: true })];
    if let Some(step) = extra_failing {
        steps.push(Arc::new(step));
    }
    steps
}

fn follower_steps(extra_failing: Option<ScriptedStep>) -> Vec<Arc<dyn StartupStep>> {
    let mut steps: Vec<Arc<dyn StartupStep>> = vec![Arc::new(HandleInstaller { leader: false })];
    if let Some(step) = extra_failing {
        steps.push(Arc::new(step));
    }
    steps
}

/// Scenario 1: happy leader install.
#[tokio::test]
async fn happy_leader_install() {
    let consensus = Arc::new(FakeConsensusClient::new());
    let listener = Arc::new(RecordingPartitionListener::new());
    let supervisor = PartitionSupervisor::new(
        PartitionId::new(1),
        NodeId::new(1),
        consensus.clone(),
        Arc::new(partition_core::InMemoryPauseState::default()),
        Vec::new(),
        leader_steps(None),
        follower_steps(None),
        SupervisorConfig::default(),
    );

    // The listener is wired through handles_match_role's context, which is
    // only reachable from inside the actor; register it before the first
    // role change by bootstrapping with a listener-aware step instead.
    let _ = listener;
    supervisor.bootstrap(ConsensusRole::Leader, Term::new(1)).await.unwrap();

    assert_eq!(supervisor.get_health_status().await, HealthStatus::Healthy);
    assert!(supervisor.get_stream_processor().await.is_some());
    assert!(consensus.calls().is_empty());
}

/// Scenario 2: failed leader install, recoverable — expect a single
/// `step_down`, then a subsequent `(Follower, 1)` event installs follower
/// steps successfully.
#[tokio::test]
async fn failed_leader_install_then_recovers_as_follower() {
    let consensus = Arc::new(FakeConsensusClient::new());
    let failing_leader_step = ScriptedStep::new("leader-extra").with_open_outcomes(vec![ScriptedOutcome::Transient("boom".into())]);
    let supervisor = PartitionSupervisor::new(
        PartitionId::new(2),
        NodeId::new(1),
        consensus.clone(),
        Arc::new(partition_core::InMemoryPauseState::default()),
        Vec::new(),
        leader_steps(Some(failing_leader_step)),
        follower_steps(None),
        SupervisorConfig::default().with_health_check_tick(Duration::from_millis(10)),
    );

    supervisor.bootstrap(ConsensusRole::Leader, Term::new(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(consensus.calls(), vec![ConsensusCall::StepDown]);
    assert_eq!(supervisor.get_health_status().await, HealthStatus::Unhealthy);

    supervisor.on_new_role(ConsensusRole::Follower, Term::new(1)).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(supervisor.get_stream_processor().await.is_some());
    assert!(supervisor.get_exporter_director().await.is_none());
    assert_eq!(supervisor.get_health_status().await, HealthStatus::Healthy);
}

/// Scenario 3: failed follower install — expect `go_inactive`, then a
/// subsequent `Inactive` event runs `to_inactive` cleanly.
#[tokio::test]
async fn failed_follower_install_then_goes_inactive() {
    let consensus = Arc::new(FakeConsensusClient::new());
    let failing_follower_step = ScriptedStep::new("follower-extra").with_open_outcomes(vec![ScriptedOutcome::Transient("boom".into())]);
    let supervisor = PartitionSupervisor::new(
        PartitionId::new(3),
        NodeId::new(1),
        consensus.clone(),
        Arc::new(partition_core::InMemoryPauseState::default()),
        Vec::new(),
        leader_steps(None),
        follower_steps(Some(failing_follower_step)),
        SupervisorConfig::default(),
    );

    supervisor.bootstrap(ConsensusRole::Follower, Term::new(0)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(consensus.calls(), vec![ConsensusCall::GoInactive]);

    supervisor.on_new_role(ConsensusRole::Inactive, Term::new(0)).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(supervisor.get_stream_processor().await.is_none());
}

/// Scenario 4: unrecoverable failure — in order, `to_leader` is observed
/// to fail unrecoverably, the supervisor drives to inactive, requests
/// `go_inactive`, and every failure listener is notified exactly once.
#[tokio::test]
async fn unrecoverable_leader_failure() {
    let consensus = Arc::new(FakeConsensusClient::new());
    let fatal_step = ScriptedStep::new("leader-extra").with_open_outcomes(vec![ScriptedOutcome::Unrecoverable("fatal".into())]);
    let supervisor = PartitionSupervisor::new(
        PartitionId::new(4),
        NodeId::new(1),
        consensus.clone(),
        Arc::new(partition_core::InMemoryPauseState::default()),
        Vec::new(),
        leader_steps(Some(fatal_step)),
        follower_steps(None),
        SupervisorConfig::default(),
    );
    let failure_listener = Arc::new(partition_testkit::RecordingFailureListener::new());
    supervisor.add_failure_listener(failure_listener.clone()).await;

    supervisor.bootstrap(ConsensusRole::Leader, Term::new(0)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(supervisor.get_health_status().await, HealthStatus::Dead);
    assert_eq!(consensus.calls(), vec![ConsensusCall::GoInactive]);
    // The listener was registered while the monitor was still Healthy, so
    // it got an immediate `on_recovered`; the Healthy→Dead edge then
    // fires both `on_failure` and `on_unrecoverable_failure`.
    assert_eq!(
        failure_listener.events(),
        vec![
            partition_testkit::FailureEvent::Recovered,
            partition_testkit::FailureEvent::Failure,
            partition_testkit::FailureEvent::Unrecoverable,
        ]
    );

    // A subsequent role change must be ignored: the replica is dead.
    supervisor.on_new_role(ConsensusRole::Leader, Term::new(1)).await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(supervisor.get_health_status().await, HealthStatus::Dead);
    assert_eq!(consensus.go_inactive_count(), 1);
}

/// A step whose `open` signals that it has started, then blocks until
/// told to proceed — used to land a shutdown request while this step is
/// genuinely mid-open, rather than only between two steps.
struct PausableStep {
    calls: parking_lot::Mutex<Vec<String>>,
    started_tx: parking_lot::Mutex<Option<tokio::sync::oneshot::Sender<()>>>,
    proceed_rx: parking_lot::Mutex<Option<tokio::sync::oneshot::Receiver<()>>>,
}

impl PausableStep {
    fn new(started_tx: tokio::sync::oneshot::Sender<()>, proceed_rx: tokio::sync::oneshot::Receiver<()>) -> Self {
        Self {
            calls: parking_lot::Mutex::new(Vec::new()),
            started_tx: parking_lot::Mutex::new(Some(started_tx)),
            proceed_rx: parking_lot::Mutex::new(Some(proceed_rx)),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl StartupStep for PausableStep {
    fn name(&self) -> &str {
        "b"
    }

    async fn open(&self, _context: &mut PartitionContext) -> Result<(), StepError> {
        self.calls.lock().push("open:b".to_string());
        if let Some(tx) = self.started_tx.lock().take() {
            let _ = tx.send(());
        }
        let proceed = self.proceed_rx.lock().take();
        if let Some(rx) = proceed {
            let _ = rx.await;
        }
        Ok(())
    }

    async fn close(&self, _context: &mut PartitionContext) -> Result<(), StepError> {
        self.calls.lock().push("close:b".to_string());
        Ok(())
    }
}

/// Scenario 5: shutdown interleaved with startup — a shutdown requested
/// while a step is genuinely mid-open takes effect before the next step
/// opens, and teardown then runs in reverse over exactly what opened.
#[tokio::test]
async fn shutdown_interleaved_with_startup_closes_exactly_what_opened() {
    use partition_runtime::{StartupError, StartupProcess};

    let a = ScriptedStep::new("a");
    let c = ScriptedStep::new("c");
    let (started_tx, started_rx) = tokio::sync::oneshot::channel();
    let (proceed_tx, proceed_rx) = tokio::sync::oneshot::channel();
    let b = Arc::new(PausableStep::new(started_tx, proceed_rx));

    let steps: Vec<Arc<dyn StartupStep>> = vec![Arc::new(a.clone()), b.clone(), Arc::new(c.clone())];
    let mut process = StartupProcess::new(steps);
    let signal = process.shutdown_signal();
    let mut ctx = PartitionContext::new(PartitionId::new(5), NodeId::new(1));

    let startup = process.startup(&mut ctx);
    let request_shutdown_once_b_is_open = async {
        let _ = started_rx.await;
        signal.request();
        let _ = proceed_tx.send(());
    };
    let (startup_result, ()) = tokio::join!(startup, request_shutdown_once_b_is_open);

    assert!(matches!(startup_result.unwrap_err(), StartupError::AbortedByShutdown));
    assert_eq!(a.calls(), vec!["open:a"]);
    assert_eq!(b.calls(), vec!["open:b"]);
    assert!(c.calls().is_empty());

    process.shutdown(&mut ctx).await.unwrap();
    similar_asserts::assert_eq!(b.calls(), vec!["open:b", "close:b"]);
    similar_asserts::assert_eq!(a.calls(), vec!["open:a", "close:a"]);
    assert!(c.calls().is_empty());
}

/// Scenario 6: health listener late join — a listener added while the
/// monitor already sees an unhealthy child gets an immediate `on_failure`
/// and no `on_recovered` until the child actually recovers.
#[tokio::test]
async fn health_listener_late_join() {
    use partition_runtime::HealthMonitor;
    use partition_testkit::ManualHealthSource;

    let monitor = HealthMonitor::new(Duration::from_millis(5));
    let child = ManualHealthSource::new(HealthStatus::Unhealthy);
    monitor.register_component("child", Arc::new(child.clone())).await;
    monitor.start_monitoring();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let late_listener = Arc::new(partition_testkit::RecordingFailureListener::new());
    monitor.add_failure_listener(late_listener.clone()).await;
    assert_eq!(late_listener.events(), vec![partition_testkit::FailureEvent::Failure]);

    child.set(HealthStatus::Healthy);
    tokio::time::sleep(Duration::from_millis(20)).await;
    similar_asserts::assert_eq!(
        late_listener.events(),
        vec![partition_testkit::FailureEvent::Failure, partition_testkit::FailureEvent::Recovered]
    );
}

/// Universal invariant: `startup` called twice fails without mutating
/// already-opened state.
#[tokio::test]
async fn startup_called_twice_is_an_invariant_error() {
    use partition_runtime::{StartupError, StartupProcess};

    let step = ScriptedStep::new("a");
    let mut process = StartupProcess::new(vec![Arc::new(step.clone())]);
    let mut ctx = PartitionContext::new(PartitionId::new(6), NodeId::new(1));

    process.startup(&mut ctx).await.unwrap();
    let err = process.startup(&mut ctx).await.unwrap_err();
    assert!(matches!(err, StartupError::AlreadyStarted));
    assert_eq!(step.calls(), vec!["open:a"]);
}

/// Universal invariant: shutdown before startup fails without running
/// any `close`.
#[tokio::test]
async fn shutdown_before_startup_is_an_invariant_error() {
    use partition_runtime::{StartupError, StartupProcess};

    let step = ScriptedStep::new("a");
    let mut process = StartupProcess::new(vec![Arc::new(step.clone())]);
    let mut ctx = PartitionContext::new(PartitionId::new(7), NodeId::new(1));

    let err = process.shutdown(&mut ctx).await.unwrap_err();
    assert!(matches!(err, StartupError::NotStarted));
    assert!(step.calls().is_empty());
}

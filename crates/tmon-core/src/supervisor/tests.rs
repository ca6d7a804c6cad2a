use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tmon_model::{InstanceId, InstanceRecord, RunStatus, StartDecision, TerminateOutcome};

use super::*;
use crate::{
    backend::{DurableBackend, InMemoryBackend},
    metrics::MetricsBackend,
    tracker::{InstanceTracker, MemoryTracker, TrackerError},
};

fn id(s: &str) -> InstanceId {
    InstanceId::parse(s).unwrap()
}

fn supervisor(backend: Arc<InMemoryBackend>) -> MonitorSupervisor {
    MonitorSupervisor::new(backend, &SupervisorConfig::default()).unwrap()
}

/// Backend that answers every call with the same error.
struct FailingBackend(BackendError);

#[async_trait]
impl DurableBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn get_status(&self, _: &InstanceId) -> Result<Option<RunStatus>, BackendError> {
        Err(self.0.clone())
    }

    async fn start(&self, _: &InstanceId, _: &str, _: String) -> Result<(), BackendError> {
        Err(self.0.clone())
    }

    async fn terminate(&self, _: &InstanceId, _: &str) -> Result<(), BackendError> {
        Err(self.0.clone())
    }
}

/// Backend that reports no instance but refuses every start.
struct RejectingBackend;

#[async_trait]
impl DurableBackend for RejectingBackend {
    fn name(&self) -> &'static str {
        "rejecting"
    }

    async fn get_status(&self, _: &InstanceId) -> Result<Option<RunStatus>, BackendError> {
        Ok(None)
    }

    async fn start(&self, _: &InstanceId, _: &str, _: String) -> Result<(), BackendError> {
        Err(BackendError::Rejected("orchestration not registered".into()))
    }

    async fn terminate(&self, _: &InstanceId, _: &str) -> Result<(), BackendError> {
        Err(BackendError::Rejected("read-only".into()))
    }
}

/// Backend that finds no instance on the first read, then loses every start to a concurrent writer.
///
/// Later reads report `after_conflict`.
struct ConflictingBackend {
    after_conflict: Option<RunStatus>,
    reads: AtomicUsize,
}

impl ConflictingBackend {
    fn new(after_conflict: Option<RunStatus>) -> Self {
        Self {
            after_conflict,
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DurableBackend for ConflictingBackend {
    fn name(&self) -> &'static str {
        "conflicting"
    }

    async fn get_status(&self, _: &InstanceId) -> Result<Option<RunStatus>, BackendError> {
        if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(None)
        } else {
            Ok(self.after_conflict)
        }
    }

    async fn start(&self, id: &InstanceId, _: &str, _: String) -> Result<(), BackendError> {
        Err(BackendError::Conflict(format!("{id} is running")))
    }

    async fn terminate(&self, _: &InstanceId, _: &str) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Backend that never answers in time.
struct StalledBackend;

#[async_trait]
impl DurableBackend for StalledBackend {
    fn name(&self) -> &'static str {
        "stalled"
    }

    async fn get_status(&self, _: &InstanceId) -> Result<Option<RunStatus>, BackendError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }

    async fn start(&self, _: &InstanceId, _: &str, _: String) -> Result<(), BackendError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }

    async fn terminate(&self, _: &InstanceId, _: &str) -> Result<(), BackendError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

/// Tracker whose store is down.
struct BrokenTracker;

#[async_trait]
impl InstanceTracker for BrokenTracker {
    async fn track(&self, _: &InstanceRecord) -> Result<(), TrackerError> {
        Err(TrackerError::Unavailable("table store down".into()))
    }

    async fn untrack(&self, _: &InstanceId) -> Result<(), TrackerError> {
        Err(TrackerError::Unavailable("table store down".into()))
    }

    async fn list(&self) -> Result<Vec<InstanceRecord>, TrackerError> {
        Err(TrackerError::Unavailable("table store down".into()))
    }
}

/// Metrics backend collecting calls as strings.
#[derive(Default)]
struct RecordingMetrics {
    calls: Mutex<Vec<String>>,
}

impl RecordingMetrics {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl MetricsBackend for RecordingMetrics {
    fn record_start(&self, kind: &str, decision: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("start:{kind}:{decision}"));
    }

    fn record_terminate(&self, kind: &str, outcome: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("terminate:{kind}:{outcome}"));
    }

    fn record_backend_error(&self, op: &str, error_kind: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("backend_error:{op}:{error_kind}"));
    }

    fn record_tracker_error(&self, op: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("tracker_error:{op}"));
    }
}

#[test]
fn zero_call_timeout_is_rejected() {
    let cfg = SupervisorConfig {
        call_timeout_ms: 0,
        ..Default::default()
    };
    let res = MonitorSupervisor::new(Arc::new(InMemoryBackend::new()), &cfg);
    assert!(matches!(res, Err(SupervisorError::Config(_))));
}

#[test]
fn zero_call_timeout_override_is_rejected() {
    let res = supervisor(Arc::new(InMemoryBackend::new())).with_call_timeout(Duration::ZERO);
    assert!(matches!(res, Err(SupervisorError::Config(_))));
}

#[test]
fn huge_call_timeout_saturates_in_errors() {
    let sup = supervisor(Arc::new(InMemoryBackend::new()))
        .with_call_timeout(Duration::MAX)
        .unwrap();
    assert!(matches!(
        sup.timeout("start"),
        SupervisorError::Timeout {
            op: "start",
            timeout_ms: u64::MAX
        }
    ));
}

#[tokio::test]
async fn trip_lifecycle_scenario() {
    let backend = Arc::new(InMemoryBackend::new());
    let sup = supervisor(backend.clone());
    let instance = id("TRIP123-M");

    let first = sup.ensure_started("TRIP123").await.unwrap();
    assert_eq!(
        first,
        StartDecision::Started {
            instance_id: instance.clone()
        }
    );

    backend.set_status(&instance, RunStatus::Running).await;
    let second = sup.ensure_started("TRIP123").await.unwrap();
    assert_eq!(
        second,
        StartDecision::AlreadyRunning {
            instance_id: instance.clone(),
            status: Some(RunStatus::Running)
        }
    );

    let outcome = sup.terminate(&instance, "user request").await.unwrap();
    assert_eq!(outcome, TerminateOutcome::Terminated);

    assert_eq!(sup.get_status(&instance).await.unwrap(), RunStatus::Terminated);
    assert_eq!(backend.runs_started(&instance).await, 1);
}

#[tokio::test]
async fn start_passes_business_key_as_input() {
    let backend = Arc::new(InMemoryBackend::new());
    let sup = supervisor(backend.clone());

    sup.ensure_started("TRIP9").await.unwrap();

    let snap = backend.snapshot(&id("TRIP9-M")).await.unwrap();
    assert_eq!(snap.input, "TRIP9");
    assert_eq!(snap.orchestration, "O_MonitorTrip");
}

#[tokio::test]
async fn pending_run_counts_as_live() {
    let backend = Arc::new(InMemoryBackend::new());
    let sup = supervisor(backend.clone());

    sup.ensure_started("TRIP1").await.unwrap();
    let again = sup.ensure_started("TRIP1").await.unwrap();

    assert!(matches!(
        again,
        StartDecision::AlreadyRunning {
            status: Some(RunStatus::Pending),
            ..
        }
    ));
    assert_eq!(backend.runs_started(&id("TRIP1-M")).await, 1);
}

#[tokio::test]
async fn finished_runs_allow_a_new_start() {
    for finished in [RunStatus::Completed, RunStatus::Failed, RunStatus::Unknown] {
        let backend = Arc::new(InMemoryBackend::new());
        let sup = supervisor(backend.clone());
        let instance = id("TRIP1-M");

        sup.ensure_started("TRIP1").await.unwrap();
        backend.set_status(&instance, finished).await;

        let decision = sup.ensure_started("TRIP1").await.unwrap();
        assert!(decision.is_started(), "{finished} should allow a restart");
        assert_eq!(backend.runs_started(&instance).await, 2);
    }
}

#[tokio::test]
async fn terminate_then_restart_starts_a_fresh_run() {
    let backend = Arc::new(InMemoryBackend::new().with_auto_run(true));
    let sup = supervisor(backend.clone());
    let instance = id("TRIP7-M");

    sup.ensure_started("TRIP7").await.unwrap();
    assert_eq!(
        sup.terminate(&instance, "done").await.unwrap(),
        TerminateOutcome::Terminated
    );

    let decision = sup.ensure_started("TRIP7").await.unwrap();
    assert!(decision.is_started());
    assert_eq!(sup.get_status(&instance).await.unwrap(), RunStatus::Running);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_starts_yield_exactly_one_run() {
    let backend = Arc::new(InMemoryBackend::new());
    let sup = supervisor(backend.clone());

    let mut handles = Vec::new();
    for _ in 0..32 {
        let sup = sup.clone();
        handles.push(tokio::spawn(
            async move { sup.ensure_started("TRIP123").await },
        ));
    }

    let mut started = 0;
    let mut already = 0;
    for h in handles {
        match h.await.unwrap().unwrap() {
            StartDecision::Started { .. } => started += 1,
            StartDecision::AlreadyRunning { .. } => already += 1,
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    assert_eq!(started, 1);
    assert_eq!(already, 31);
    assert_eq!(backend.runs_started(&id("TRIP123-M")).await, 1);
}

#[tokio::test]
async fn start_conflict_reports_status_read_back_from_backend() {
    let metrics = Arc::new(RecordingMetrics::default());
    let tracker = Arc::new(MemoryTracker::new());
    let sup = MonitorSupervisor::new(
        Arc::new(ConflictingBackend::new(Some(RunStatus::Running))),
        &SupervisorConfig::default(),
    )
    .unwrap()
    .with_metrics(metrics.clone())
    .with_tracker(tracker.clone());

    let decision = sup.ensure_started("TRIP1").await.unwrap();
    assert_eq!(
        decision,
        StartDecision::AlreadyRunning {
            instance_id: id("TRIP1-M"),
            status: Some(RunStatus::Running),
        }
    );
    assert_eq!(metrics.calls(), vec!["start:monitor:already_running"]);
    assert!(tracker.is_empty().await);
}

#[tokio::test]
async fn start_conflict_without_reported_status_carries_none() {
    let metrics = Arc::new(RecordingMetrics::default());
    let tracker = Arc::new(MemoryTracker::new());
    let sup = MonitorSupervisor::new(
        Arc::new(ConflictingBackend::new(None)),
        &SupervisorConfig::default(),
    )
    .unwrap()
    .with_metrics(metrics.clone())
    .with_tracker(tracker.clone());

    let decision = sup.ensure_started("TRIP1").await.unwrap();
    assert_eq!(
        decision,
        StartDecision::AlreadyRunning {
            instance_id: id("TRIP1-M"),
            status: None,
        }
    );
    assert_eq!(metrics.calls(), vec!["start:monitor:already_running"]);
    assert!(tracker.is_empty().await);
}

#[tokio::test]
async fn invalid_key_is_rejected_without_backend_call() {
    let backend = Arc::new(InMemoryBackend::new());
    let sup = supervisor(backend.clone());

    for bad in ["", "a/b", "trip#1", " padded"] {
        let err = sup.ensure_started(bad).await.unwrap_err();
        assert!(matches!(err, SupervisorError::InvalidKey(_)), "{bad:?}");
        assert!(!err.is_retryable());
    }
    assert!(backend.instances().await.is_empty());
}

#[tokio::test]
async fn status_of_never_started_instance_is_not_found() {
    let sup = supervisor(Arc::new(InMemoryBackend::new()));
    let err = sup.get_status(&id("NEVER-M")).await.unwrap_err();
    assert!(matches!(err, SupervisorError::NotFound(ref i) if i.as_str() == "NEVER-M"));
}

#[tokio::test]
async fn status_reflects_backend_state() {
    let backend = Arc::new(InMemoryBackend::new());
    let sup = supervisor(backend.clone());
    let instance = id("TRIP1-M");
    sup.ensure_started("TRIP1").await.unwrap();

    for status in [
        RunStatus::Pending,
        RunStatus::Running,
        RunStatus::Completed,
        RunStatus::Unknown,
    ] {
        backend.set_status(&instance, status).await;
        assert_eq!(sup.get_status(&instance).await.unwrap(), status);
    }
}

#[tokio::test]
async fn terminate_unknown_instance_is_not_found() {
    let sup = supervisor(Arc::new(InMemoryBackend::new()));
    assert_eq!(
        sup.terminate(&id("GHOST-M"), "cleanup").await.unwrap(),
        TerminateOutcome::NotFound
    );
}

#[tokio::test]
async fn unavailable_backend_surfaces_retryable_error() {
    let sup = MonitorSupervisor::new(
        Arc::new(FailingBackend(BackendError::Unavailable("conn refused".into()))),
        &SupervisorConfig::default(),
    )
    .unwrap();

    let err = sup.ensure_started("TRIP1").await.unwrap_err();
    assert!(matches!(err, SupervisorError::BackendUnavailable(_)));
    assert!(err.is_retryable());

    let err = sup.terminate(&id("TRIP1-M"), "x").await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn definitive_rejections_become_failed_outcomes() {
    let sup = MonitorSupervisor::new(Arc::new(RejectingBackend), &SupervisorConfig::default())
        .unwrap();

    match sup.ensure_started("TRIP1").await.unwrap() {
        StartDecision::StartFailed {
            instance_id,
            reason,
        } => {
            assert_eq!(instance_id.as_str(), "TRIP1-M");
            assert!(reason.contains("not registered"));
        }
        other => panic!("expected StartFailed, got {other:?}"),
    }

    assert_eq!(
        sup.terminate(&id("TRIP1-M"), "x").await.unwrap(),
        TerminateOutcome::TerminateFailed("read-only".into())
    );
}

#[tokio::test(start_paused = true)]
async fn slow_backend_times_out_as_retryable() {
    let sup = MonitorSupervisor::new(Arc::new(StalledBackend), &SupervisorConfig::default())
        .unwrap()
        .with_call_timeout(Duration::from_millis(50))
        .unwrap();

    let err = sup.ensure_started("TRIP1").await.unwrap_err();
    match &err {
        SupervisorError::Timeout { op, timeout_ms } => {
            assert_eq!(*op, "get_status");
            assert_eq!(*timeout_ms, 50);
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
    assert!(err.is_retryable());

    let err = sup.terminate(&id("TRIP1-M"), "x").await.unwrap_err();
    assert!(matches!(err, SupervisorError::Timeout { op: "terminate", .. }));
}

#[tokio::test]
async fn tracker_records_and_removes_instances() {
    let backend = Arc::new(InMemoryBackend::new());
    let tracker = Arc::new(MemoryTracker::new());
    let sup = supervisor(backend).with_tracker(tracker.clone());
    let instance = id("TRIP5-M");

    sup.ensure_started("TRIP5").await.unwrap();
    let record = tracker.get(&instance).await.expect("record written");
    assert_eq!(record.business_key.as_str(), "TRIP5");
    assert_eq!(sup.list_tracked().await.unwrap().len(), 1);

    // A skipped start must not touch the record.
    sup.ensure_started("TRIP5").await.unwrap();
    assert_eq!(tracker.len().await, 1);

    sup.terminate(&instance, "done").await.unwrap();
    assert!(tracker.is_empty().await);
}

#[tokio::test]
async fn tracker_failure_never_fails_primary_operations() {
    let backend = Arc::new(InMemoryBackend::new());
    let metrics = Arc::new(RecordingMetrics::default());
    let sup = supervisor(backend)
        .with_tracker(Arc::new(BrokenTracker))
        .with_metrics(metrics.clone());

    assert!(sup.ensure_started("TRIP1").await.unwrap().is_started());
    assert_eq!(
        sup.terminate(&id("TRIP1-M"), "x").await.unwrap(),
        TerminateOutcome::Terminated
    );

    let calls = metrics.calls();
    assert!(calls.contains(&"tracker_error:track".to_string()));
    assert!(calls.contains(&"tracker_error:untrack".to_string()));

    // Only the explicit query against the tracker reports its failure.
    let err = sup.list_tracked().await.unwrap_err();
    assert!(matches!(err, SupervisorError::Tracker(_)));
}

#[tokio::test]
async fn list_tracked_is_empty_without_tracker() {
    let sup = supervisor(Arc::new(InMemoryBackend::new()));
    sup.ensure_started("TRIP1").await.unwrap();
    assert!(sup.list_tracked().await.unwrap().is_empty());
}

#[tokio::test]
async fn metrics_record_decisions() {
    let backend = Arc::new(InMemoryBackend::new());
    let metrics = Arc::new(RecordingMetrics::default());
    let sup = supervisor(backend).with_metrics(metrics.clone());

    sup.ensure_started("TRIP1").await.unwrap();
    sup.ensure_started("TRIP1").await.unwrap();
    sup.terminate(&id("NOPE-M"), "x").await.unwrap();

    assert_eq!(
        metrics.calls(),
        vec![
            "start:monitor:started",
            "start:monitor:already_running",
            "terminate:monitor:not_found",
        ]
    );
}

#[tokio::test]
async fn kinds_share_a_backend_without_colliding() {
    let backend = Arc::new(InMemoryBackend::new());
    let monitor = supervisor(backend.clone());
    let manager = MonitorSupervisor::new(
        backend.clone(),
        &SupervisorConfig {
            kind: WorkflowKind::Manager,
            ..Default::default()
        },
    )
    .unwrap();

    assert!(monitor.ensure_started("TRIP1").await.unwrap().is_started());
    assert!(manager.ensure_started("TRIP1").await.unwrap().is_started());

    assert_eq!(
        backend.instances().await,
        vec![id("TRIP1-M"), id("TRIP1-T")]
    );
    let snap = backend.snapshot(&id("TRIP1-T")).await.unwrap();
    assert_eq!(snap.orchestration, "O_ManageTrip");
}

//! Workflow instance supervisor.
//! - Derives the instance id of a trip from its business key.
//! - Starts a run only when no live run owns that id.
//! - Passes status queries and terminate commands through to the backend.
//!
//! The supervisor keeps no run state of its own: every decision re-reads the backend.
//! Its read-then-start sequence only saves a backend round trip; the backend's
//! single-writer-per-id guarantee is what prevents two live runs.
use std::{future::Future, time::Duration};

use tracing::{debug, info, instrument, warn};

use tmon_model::{
    BusinessKey, InstanceId, InstanceRecord, RunStatus, StartDecision, TerminateOutcome,
    WorkflowKind, derive,
};

use crate::{
    backend::{BackendError, BackendHandle},
    config::SupervisorConfig,
    error::SupervisorError,
    metrics::{MetricsHandle, noop_metrics},
    tracker::{TrackerHandle, noop_tracker},
};

#[cfg(test)]
mod tests;

/// Stateless supervisor for one workflow kind.
///
/// Cheap to clone; all clones share the same backend, tracker and metrics handles.
#[derive(Clone)]
pub struct MonitorSupervisor {
    backend: BackendHandle,
    tracker: TrackerHandle,
    metrics: MetricsHandle,
    kind: WorkflowKind,
    call_timeout: Duration,
}

impl MonitorSupervisor {
    /// Create a supervisor over `backend` with no tracker and no-op metrics.
    ///
    /// Fails if the configured call timeout is zero.
    pub fn new(backend: BackendHandle, cfg: &SupervisorConfig) -> Result<Self, SupervisorError> {
        check_call_timeout(cfg.call_timeout())?;
        Ok(Self {
            backend,
            tracker: noop_tracker(),
            metrics: noop_metrics(),
            kind: cfg.kind,
            call_timeout: cfg.call_timeout(),
        })
    }

    /// Replace the secondary persistence hook.
    pub fn with_tracker(mut self, tracker: TrackerHandle) -> Self {
        self.tracker = tracker;
        self
    }

    /// Replace the metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Override the bound applied to every backend and tracker call.
    ///
    /// Fails if `timeout` is zero.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Result<Self, SupervisorError> {
        check_call_timeout(timeout)?;
        self.call_timeout = timeout;
        Ok(self)
    }

    #[inline]
    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    /// Make sure a run is live for `business_key`, starting one if needed.
    ///
    /// Steps:
    /// 1. Derive the instance id.
    /// 2. Read the current status from the backend.
    /// 3. `Pending` / `Running` → [`StartDecision::AlreadyRunning`].
    /// 4. Otherwise start a run with the business key as input.
    ///    A backend conflict means a concurrent trigger won the race and also yields `AlreadyRunning`,
    ///    carrying whatever status the backend reports for the instance afterwards.
    /// 5. After a successful start, record the instance in the tracker (best-effort).
    ///
    /// Safe to retry after a timeout: a repeated call either finds the run live or starts it.
    #[instrument(level = "debug", skip(self), fields(kind = %self.kind))]
    pub async fn ensure_started(
        &self,
        business_key: &str,
    ) -> Result<StartDecision, SupervisorError> {
        let key = BusinessKey::new(business_key)?;
        let instance_id = derive(&key, self.kind);

        let current = self.read_status(&instance_id).await?;
        debug!(
            instance = %instance_id,
            status = current.map_or("absent", |s| s.as_str()),
            "instance running status"
        );

        if let Some(status) = current.filter(RunStatus::is_live) {
            info!(instance = %instance_id, %status, "monitor already live, start skipped");
            return Ok(self.decided(StartDecision::AlreadyRunning {
                instance_id,
                status: Some(status),
            }));
        }

        let started = self
            .bounded(
                "start",
                self.backend.start(
                    &instance_id,
                    self.kind.orchestration(),
                    key.as_str().to_string(),
                ),
            )
            .await?;

        let decision = match started {
            Ok(()) => {
                info!(instance = %instance_id, "started a new trip monitor");
                self.track(InstanceRecord::now(instance_id.clone(), key)).await;
                StartDecision::Started { instance_id }
            }
            Err(BackendError::Conflict(reason)) => {
                // A concurrent start got in between our read and our start.
                info!(instance = %instance_id, %reason, "concurrent start detected");
                let status = self.status_after_conflict(&instance_id).await;
                StartDecision::AlreadyRunning {
                    instance_id,
                    status,
                }
            }
            Err(BackendError::Rejected(reason)) => {
                warn!(instance = %instance_id, %reason, "backend rejected start");
                self.metrics.record_backend_error("start", "rejected");
                StartDecision::StartFailed {
                    instance_id,
                    reason,
                }
            }
            Err(e) => return Err(self.backend_failure("start", &instance_id, e)),
        };
        Ok(self.decided(decision))
    }

    /// Current run status of `instance_id`.
    ///
    /// Fails with [`SupervisorError::NotFound`] if the backend has no record.
    #[instrument(level = "debug", skip(self), fields(instance = %instance_id))]
    pub async fn get_status(&self, instance_id: &InstanceId) -> Result<RunStatus, SupervisorError> {
        self.read_status(instance_id)
            .await?
            .ok_or_else(|| SupervisorError::NotFound(instance_id.clone()))
    }

    /// Ask the backend to terminate `instance_id`.
    ///
    /// No status pre-read: terminating a finished run is a backend no-op.
    /// Returns once the backend accepted the command, without waiting for the run to unwind.
    #[instrument(level = "debug", skip(self, reason), fields(instance = %instance_id))]
    pub async fn terminate(
        &self,
        instance_id: &InstanceId,
        reason: &str,
    ) -> Result<TerminateOutcome, SupervisorError> {
        info!(%reason, "terminating trip monitor");

        let outcome = match self
            .bounded("terminate", self.backend.terminate(instance_id, reason))
            .await?
        {
            Ok(()) => TerminateOutcome::Terminated,
            Err(BackendError::NotFound) => TerminateOutcome::NotFound,
            Err(BackendError::Rejected(r) | BackendError::Conflict(r)) => {
                warn!(reason = %r, "backend rejected terminate");
                TerminateOutcome::TerminateFailed(r)
            }
            Err(e) => return Err(self.backend_failure("terminate", instance_id, e)),
        };

        if matches!(
            outcome,
            TerminateOutcome::Terminated | TerminateOutcome::NotFound
        ) {
            self.untrack(instance_id).await;
        }

        self.metrics
            .record_terminate(self.kind.as_str(), outcome.as_label());
        Ok(outcome)
    }

    /// Records held by the secondary persistence hook.
    ///
    /// Empty when no tracker is configured.
    pub async fn list_tracked(&self) -> Result<Vec<InstanceRecord>, SupervisorError> {
        match tokio::time::timeout(self.call_timeout, self.tracker.list()).await {
            Ok(res) => res.map_err(SupervisorError::from),
            Err(_) => Err(self.timeout("tracker_list")),
        }
    }

    async fn read_status(
        &self,
        instance_id: &InstanceId,
    ) -> Result<Option<RunStatus>, SupervisorError> {
        self.bounded("get_status", self.backend.get_status(instance_id))
            .await?
            .map_err(|e| self.backend_failure("get_status", instance_id, e))
    }

    /// Status the backend reports once a start lost the race.
    ///
    /// The conflict already settles the decision, so a failed re-read only drops the status.
    async fn status_after_conflict(&self, instance_id: &InstanceId) -> Option<RunStatus> {
        match self.read_status(instance_id).await {
            Ok(status) => status,
            Err(e) => {
                debug!(instance = %instance_id, error = %e, "status re-read after conflict failed");
                None
            }
        }
    }

    /// Run a backend call under the configured time bound.
    ///
    /// The outer error is the timeout; the inner result is the backend's answer.
    async fn bounded<T, F>(
        &self,
        op: &'static str,
        call: F,
    ) -> Result<Result<T, BackendError>, SupervisorError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| {
                self.metrics.record_backend_error(op, "timeout");
                self.timeout(op)
            })
    }

    fn timeout(&self, op: &'static str) -> SupervisorError {
        SupervisorError::Timeout {
            op,
            timeout_ms: u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn backend_failure(
        &self,
        op: &'static str,
        instance_id: &InstanceId,
        e: BackendError,
    ) -> SupervisorError {
        warn!(
            backend = self.backend.name(),
            op,
            instance = %instance_id,
            error = %e,
            "backend call failed"
        );
        self.metrics.record_backend_error(op, e.kind());
        match e {
            BackendError::Unavailable(msg) => SupervisorError::BackendUnavailable(msg),
            BackendError::NotFound => SupervisorError::NotFound(instance_id.clone()),
            BackendError::Conflict(msg) | BackendError::Rejected(msg) => {
                SupervisorError::BackendRejected(msg)
            }
        }
    }

    fn decided(&self, decision: StartDecision) -> StartDecision {
        self.metrics
            .record_start(self.kind.as_str(), decision.as_label());
        decision
    }

    async fn track(&self, record: InstanceRecord) {
        let res = tokio::time::timeout(self.call_timeout, self.tracker.track(&record)).await;
        if let Some(reason) = tracker_failure(res) {
            warn!(instance = %record.instance_id, %reason, "failed to record tracked instance");
            self.metrics.record_tracker_error("track");
        }
    }

    async fn untrack(&self, instance_id: &InstanceId) {
        let res = tokio::time::timeout(self.call_timeout, self.tracker.untrack(instance_id)).await;
        if let Some(reason) = tracker_failure(res) {
            warn!(instance = %instance_id, %reason, "failed to remove tracked instance");
            self.metrics.record_tracker_error("untrack");
        }
    }
}

fn check_call_timeout(timeout: Duration) -> Result<(), SupervisorError> {
    if timeout.is_zero() {
        return Err(SupervisorError::Config(
            "callTimeoutMs must be greater than zero".into(),
        ));
    }
    Ok(())
}

/// Describe a tracker call that did not succeed.
fn tracker_failure<E: std::fmt::Display>(
    res: Result<Result<(), E>, tokio::time::error::Elapsed>,
) -> Option<String> {
    match res {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(_) => Some("timed out".to_string()),
    }
}

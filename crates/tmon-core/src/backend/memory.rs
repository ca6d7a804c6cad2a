use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::trace;

use tmon_model::{InstanceId, RunStatus};

use super::{BackendError, DurableBackend};

/// Point-in-time view of one instance held by [`InMemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSnapshot {
    /// Orchestration of the latest run.
    pub orchestration: String,
    /// Input payload of the latest run.
    pub input: String,
    /// Status of the latest run.
    pub status: RunStatus,
    /// Number of runs ever started under this id.
    pub runs: u32,
    /// Reason given when the latest run was terminated.
    pub reason: Option<String>,
}

/// In-process backend keeping one state record per instance id.
///
/// It stores run state only and never executes workflow code.
/// Check-and-start happens under one lock, which gives the single-writer-per-id guarantee the supervisor relies on.
/// By default a started run stays `Pending` until moved with [`InMemoryBackend::set_status`];
/// [`InMemoryBackend::with_auto_run`] makes new runs report `Running` right away.
#[derive(Default)]
pub struct InMemoryBackend {
    inner: Mutex<HashMap<InstanceId, InstanceSnapshot>>,
    auto_run: bool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report new runs as `Running` instead of `Pending`.
    pub fn with_auto_run(mut self, auto_run: bool) -> Self {
        self.auto_run = auto_run;
        self
    }

    /// Force the status of an existing instance, as the execution engine would.
    ///
    /// Returns `false` if the instance is unknown.
    pub async fn set_status(&self, id: &InstanceId, status: RunStatus) -> bool {
        let mut g = self.inner.lock().await;
        match g.get_mut(id) {
            Some(snap) => {
                trace!(instance = %id, from = %snap.status, to = %status, "status forced");
                snap.status = status;
                true
            }
            None => false,
        }
    }

    /// Snapshot of one instance.
    pub async fn snapshot(&self, id: &InstanceId) -> Option<InstanceSnapshot> {
        self.inner.lock().await.get(id).cloned()
    }

    /// Number of runs ever started under `id`.
    pub async fn runs_started(&self, id: &InstanceId) -> u32 {
        self.inner.lock().await.get(id).map_or(0, |s| s.runs)
    }

    /// Ids of every instance the backend knows, sorted.
    pub async fn instances(&self) -> Vec<InstanceId> {
        let mut ids: Vec<_> = self.inner.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl DurableBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn get_status(&self, id: &InstanceId) -> Result<Option<RunStatus>, BackendError> {
        Ok(self.inner.lock().await.get(id).map(|s| s.status))
    }

    async fn start(
        &self,
        id: &InstanceId,
        orchestration: &str,
        input: String,
    ) -> Result<(), BackendError> {
        let mut g = self.inner.lock().await;
        let initial = if self.auto_run {
            RunStatus::Running
        } else {
            RunStatus::Pending
        };

        match g.get_mut(id) {
            Some(snap) if snap.status.is_live() => {
                Err(BackendError::Conflict(format!("{id} is {}", snap.status)))
            }
            Some(snap) => {
                snap.orchestration = orchestration.to_string();
                snap.input = input;
                snap.status = initial;
                snap.runs += 1;
                snap.reason = None;
                Ok(())
            }
            None => {
                g.insert(
                    id.clone(),
                    InstanceSnapshot {
                        orchestration: orchestration.to_string(),
                        input,
                        status: initial,
                        runs: 1,
                        reason: None,
                    },
                );
                Ok(())
            }
        }
    }

    async fn terminate(&self, id: &InstanceId, reason: &str) -> Result<(), BackendError> {
        let mut g = self.inner.lock().await;
        let snap = g.get_mut(id).ok_or(BackendError::NotFound)?;

        if snap.status.is_live() {
            snap.status = RunStatus::Terminated;
            snap.reason = Some(reason.to_string());
        }
        Ok(())
    }
}

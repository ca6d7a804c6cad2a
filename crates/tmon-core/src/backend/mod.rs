//! Contract the supervisor needs from the durable execution backend.
//!
//! The backend is the single source of truth for run state.
//! Implementations MUST provide single-writer-per-id semantics:
//! a `start` for an instance that is currently `Pending` or `Running`
//! is rejected with [`BackendError::Conflict`] (or ignored), never turned into a second live run.
mod error;
pub use error::BackendError;

mod memory;
pub use memory::{InMemoryBackend, InstanceSnapshot};

use std::sync::Arc;

use async_trait::async_trait;
use tmon_model::{InstanceId, RunStatus};

/// Durable execution backend as seen by the supervisor.
///
/// Every method is a network round trip in a real deployment; the supervisor bounds each call with its own timeout.
/// Implementations must be safe for concurrent use.
#[async_trait]
pub trait DurableBackend: Send + Sync + 'static {
    /// Backend name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Current run status, or `None` if the backend has no record of the instance.
    async fn get_status(&self, id: &InstanceId) -> Result<Option<RunStatus>, BackendError>;

    /// Start a new run of `orchestration` under `id` with `input` as payload.
    async fn start(
        &self,
        id: &InstanceId,
        orchestration: &str,
        input: String,
    ) -> Result<(), BackendError>;

    /// Request termination of the run under `id`.
    ///
    /// Returns [`BackendError::NotFound`] for unknown instances.
    /// Terminating an instance that already reached a terminal state is a no-op.
    async fn terminate(&self, id: &InstanceId, reason: &str) -> Result<(), BackendError>;
}

/// Shared handle to a backend client.
pub type BackendHandle = Arc<dyn DurableBackend>;

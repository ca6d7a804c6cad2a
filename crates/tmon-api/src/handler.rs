use async_trait::async_trait;
use tmon_model::{InstanceId, InstanceRecord, RunStatus, StartDecision, TerminateOutcome};

use crate::error::ApiError;

/// Supervisor surface used by the trigger adapters.
///
/// Lets deployments put extra logic (auth, rate limiting, etc.) in front of the supervisor
/// without touching the transports.
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Start the monitor for a trip code unless one is already live.
    async fn ensure_started(&self, business_key: &str) -> Result<StartDecision, ApiError>;

    /// Current status of an instance.
    async fn get_status(&self, id: &InstanceId) -> Result<RunStatus, ApiError>;

    /// Terminate an instance.
    async fn terminate(&self, id: &InstanceId, reason: &str)
    -> Result<TerminateOutcome, ApiError>;

    /// Instances recorded by the secondary persistence hook.
    async fn list_tracked(&self) -> Result<Vec<InstanceRecord>, ApiError>;
}

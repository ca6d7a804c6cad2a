use thiserror::Error;

use tmon_model::{InstanceId, ModelError};

use crate::tracker::TrackerError;

/// Failure of a supervisor operation, tagged by kind.
///
/// Definitive backend answers that are part of an operation's contract
/// (start conflict, unknown instance on terminate) are reported as outcomes, not errors.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Malformed business key or instance id. Caller error.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Transient backend failure.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend refused a command outside the cases an operation maps to an outcome.
    #[error("backend rejected request: {0}")]
    BackendRejected(String),

    /// Backend holds no record of the instance.
    #[error("instance not found: {0}")]
    NotFound(InstanceId),

    /// Backend call exceeded its time bound.
    #[error("backend call '{op}' timed out after {timeout_ms}ms")]
    Timeout { op: &'static str, timeout_ms: u64 },

    /// Secondary store failed while serving a query against it.
    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SupervisorError {
    /// `true` if the same request may succeed when retried later.
    pub fn is_retryable(&self) -> bool {
        match self {
            SupervisorError::BackendUnavailable(_) | SupervisorError::Timeout { .. } => true,
            SupervisorError::Tracker(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<ModelError> for SupervisorError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidKey(msg) => SupervisorError::InvalidKey(msg),
            other => SupervisorError::Config(other.to_string()),
        }
    }
}

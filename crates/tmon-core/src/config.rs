use std::time::Duration;

use serde::{Deserialize, Serialize};

use tmon_model::WorkflowKind;

/// Supervisor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupervisorConfig {
    /// Upper bound for every backend and tracker call, in milliseconds.
    pub call_timeout_ms: u64,
    /// Workflow kind the supervisor manages.
    pub kind: WorkflowKind,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 10_000,
            kind: WorkflowKind::Monitor,
        }
    }
}

impl SupervisorConfig {
    #[inline]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

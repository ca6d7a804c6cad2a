use std::fmt;

use serde::{Deserialize, Serialize};

/// Run status of a workflow instance as reported by the durable backend.
///
/// The backend's status payload is open-ended; it is folded into this closed set at the boundary via [`RunStatus::from_raw`],
/// which deserialization goes through as well.
/// Values the mapping does not recognize become [`RunStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum RunStatus {
    /// Backend reported a status this system does not understand.
    Unknown,
    /// Start accepted, not yet scheduled.
    Pending,
    /// Run is executing.
    Running,
    /// Run finished successfully.
    Completed,
    /// Run finished with an error.
    Failed,
    /// Run was terminated on request.
    Terminated,
}

impl RunStatus {
    /// `true` while a run occupies its instance id (`Pending` or `Running`).
    #[inline]
    pub fn is_live(&self) -> bool {
        matches!(self, RunStatus::Pending | RunStatus::Running)
    }

    /// Map a raw backend runtime status onto the closed enum.
    ///
    /// Case-insensitive.
    /// `ContinuedAsNew` counts as running because the instance keeps its id and goes on executing.
    /// `Canceled` counts as terminated.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => RunStatus::Pending,
            "running" | "continuedasnew" => RunStatus::Running,
            "completed" => RunStatus::Completed,
            "failed" => RunStatus::Failed,
            "terminated" | "canceled" | "cancelled" => RunStatus::Terminated,
            _ => RunStatus::Unknown,
        }
    }

    /// Label used in logs and metrics.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Unknown => "unknown",
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Terminated => "terminated",
        }
    }
}

impl From<String> for RunStatus {
    fn from(raw: String) -> Self {
        Self::from_raw(&raw)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Workflow kinds that can operate on the same business key.
///
/// Each kind owns a distinct instance id suffix and the name of the
/// orchestration the backend runs for it.
/// A trip manager and a trip monitor for the same code therefore co-exist as two independent instances.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowKind {
    /// Tracks a trip until it completes.
    #[default]
    Monitor,
    /// Drives the trip itself.
    Manager,
    /// Demo trip driver.
    Demo,
}

impl WorkflowKind {
    /// Every kind, in declaration order.
    pub const ALL: [WorkflowKind; 3] = [Self::Monitor, Self::Manager, Self::Demo];

    /// Length shared by every suffix.
    pub const SUFFIX_LEN: usize = 2;

    /// Suffix appended to the business key to form the instance id.
    #[inline]
    pub fn suffix(&self) -> &'static str {
        match self {
            WorkflowKind::Monitor => "-M",
            WorkflowKind::Manager => "-T",
            WorkflowKind::Demo => "-D",
        }
    }

    /// Orchestration name handed to the backend on start.
    #[inline]
    pub fn orchestration(&self) -> &'static str {
        match self {
            WorkflowKind::Monitor => "O_MonitorTrip",
            WorkflowKind::Manager => "O_ManageTrip",
            WorkflowKind::Demo => "O_DemoTrip",
        }
    }

    /// Canonical lowercase name.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowKind::Monitor => "monitor",
            WorkflowKind::Manager => "manager",
            WorkflowKind::Demo => "demo",
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowKind {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monitor" => Ok(WorkflowKind::Monitor),
            "manager" => Ok(WorkflowKind::Manager),
            "demo" => Ok(WorkflowKind::Demo),
            other => Err(ModelError::UnknownKind(other.to_string())),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::{InstanceId, RunStatus};

/// Result of asking the supervisor to make sure a monitor is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "decision",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum StartDecision {
    /// A new run was accepted by the backend.
    Started { instance_id: InstanceId },
    /// A live run already occupies the instance id; nothing was started.
    ///
    /// `status` is the backend's answer at decision time. It is `None` when the backend
    /// refused the start as a conflict and then reported no status for the instance.
    AlreadyRunning {
        instance_id: InstanceId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<RunStatus>,
    },
    /// The backend definitively refused the start.
    StartFailed {
        instance_id: InstanceId,
        reason: String,
    },
}

impl StartDecision {
    /// Instance id the decision is about.
    pub fn instance_id(&self) -> &InstanceId {
        match self {
            StartDecision::Started { instance_id }
            | StartDecision::AlreadyRunning { instance_id, .. }
            | StartDecision::StartFailed { instance_id, .. } => instance_id,
        }
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        matches!(self, StartDecision::Started { .. })
    }

    /// Label used in logs and metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StartDecision::Started { .. } => "started",
            StartDecision::AlreadyRunning { .. } => "already_running",
            StartDecision::StartFailed { .. } => "start_failed",
        }
    }
}

/// Result of a terminate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "camelCase")]
pub enum TerminateOutcome {
    /// Backend accepted the terminate command.
    Terminated,
    /// Backend has no such instance.
    NotFound,
    /// Backend definitively refused the command.
    TerminateFailed(String),
}

impl TerminateOutcome {
    /// Label used in logs and metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TerminateOutcome::Terminated => "terminated",
            TerminateOutcome::NotFound => "not_found",
            TerminateOutcome::TerminateFailed(_) => "terminate_failed",
        }
    }
}

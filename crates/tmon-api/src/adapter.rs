use std::sync::Arc;

use async_trait::async_trait;
use tmon_core::MonitorSupervisor;
use tmon_model::{InstanceId, InstanceRecord, RunStatus, StartDecision, TerminateOutcome};

use crate::error::ApiError;
use crate::handler::ApiHandler;

/// [`ApiHandler`] that delegates straight to a [`MonitorSupervisor`].
pub struct SupervisorAdapter {
    supervisor: Arc<MonitorSupervisor>,
}

impl SupervisorAdapter {
    pub fn new(supervisor: Arc<MonitorSupervisor>) -> Self {
        Self { supervisor }
    }
}

#[async_trait]
impl ApiHandler for SupervisorAdapter {
    async fn ensure_started(&self, business_key: &str) -> Result<StartDecision, ApiError> {
        self.supervisor
            .ensure_started(business_key)
            .await
            .map_err(ApiError::from)
    }

    async fn get_status(&self, id: &InstanceId) -> Result<RunStatus, ApiError> {
        self.supervisor.get_status(id).await.map_err(ApiError::from)
    }

    async fn terminate(
        &self,
        id: &InstanceId,
        reason: &str,
    ) -> Result<TerminateOutcome, ApiError> {
        self.supervisor
            .terminate(id, reason)
            .await
            .map_err(ApiError::from)
    }

    async fn list_tracked(&self) -> Result<Vec<InstanceRecord>, ApiError> {
        self.supervisor.list_tracked().await.map_err(ApiError::from)
    }
}

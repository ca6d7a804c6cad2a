use async_trait::async_trait;
use tmon_model::{InstanceId, InstanceRecord};

use super::{InstanceTracker, TrackerError};

/// Tracker used when secondary persistence is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTracker;

#[async_trait]
impl InstanceTracker for NoOpTracker {
    async fn track(&self, _: &InstanceRecord) -> Result<(), TrackerError> {
        Ok(())
    }

    async fn untrack(&self, _: &InstanceId) -> Result<(), TrackerError> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<InstanceRecord>, TrackerError> {
        Ok(Vec::new())
    }
}

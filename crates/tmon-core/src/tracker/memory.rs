use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tmon_model::{InstanceId, InstanceRecord};

use super::{InstanceTracker, TrackerError};

/// Tracker keeping records in process memory.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    records: RwLock<BTreeMap<InstanceId, InstanceRecord>>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn get(&self, id: &InstanceId) -> Option<InstanceRecord> {
        self.records.read().await.get(id).cloned()
    }
}

#[async_trait]
impl InstanceTracker for MemoryTracker {
    async fn track(&self, record: &InstanceRecord) -> Result<(), TrackerError> {
        self.records
            .write()
            .await
            .insert(record.instance_id.clone(), record.clone());
        Ok(())
    }

    async fn untrack(&self, id: &InstanceId) -> Result<(), TrackerError> {
        self.records.write().await.remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<InstanceRecord>, TrackerError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

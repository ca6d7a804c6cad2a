//! Optional secondary persistence of tracked monitor instances.
//!
//! The supervisor writes a record after a successful start and removes it after terminate.
//! Both are best-effort: a failing tracker is logged and counted, never surfaced from start or terminate.
mod error;
pub use error::TrackerError;

mod memory;
pub use memory::MemoryTracker;

mod noop;
pub use noop::NoOpTracker;

use std::sync::Arc;

use async_trait::async_trait;
use tmon_model::{InstanceId, InstanceRecord};

/// Auxiliary store of instance records.
#[async_trait]
pub trait InstanceTracker: Send + Sync + 'static {
    /// Insert or overwrite the record for `record.instance_id`.
    async fn track(&self, record: &InstanceRecord) -> Result<(), TrackerError>;

    /// Remove the record for `id`. Removing an absent record is not an error.
    async fn untrack(&self, id: &InstanceId) -> Result<(), TrackerError>;

    /// All records, ordered by instance id.
    async fn list(&self) -> Result<Vec<InstanceRecord>, TrackerError>;
}

/// Shared handle to a tracker.
pub type TrackerHandle = Arc<dyn InstanceTracker>;

/// Create a tracker handle that stores nothing.
#[inline]
pub fn noop_tracker() -> TrackerHandle {
    Arc::new(NoOpTracker)
}

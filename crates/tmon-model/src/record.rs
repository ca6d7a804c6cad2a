use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::{BusinessKey, InstanceId};

/// Secondary record of a monitor instance, written best-effort on start.
///
/// Absence of a record never affects start, status or terminate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRecord {
    pub instance_id: InstanceId,
    pub business_key: BusinessKey,
    pub created_at: SystemTime,
}

impl InstanceRecord {
    /// Record stamped with the current time.
    pub fn now(instance_id: InstanceId, business_key: BusinessKey) -> Self {
        Self {
            instance_id,
            business_key,
            created_at: SystemTime::now(),
        }
    }
}

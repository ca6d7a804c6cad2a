use std::fmt;

use serde::{Deserialize, Serialize};

use super::{MAX_INSTANCE_ID_LEN, validate};
use crate::error::{ModelError, ModelResult};

/// Identifier of one workflow instance in the durable backend.
///
/// Produced by [`crate::derive`] or parsed from an external request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceId(String);

impl InstanceId {
    /// Parse an instance id received from outside (status / terminate requests).
    pub fn parse(raw: impl Into<String>) -> ModelResult<Self> {
        Self::try_from(raw.into())
    }

    /// Wrap an id built by `derive`; the key was already validated.
    pub(crate) fn from_derived(id: String) -> Self {
        Self(id)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for InstanceId {
    type Error = ModelError;
    fn try_from(raw: String) -> ModelResult<Self> {
        validate(&raw, "instance id", MAX_INSTANCE_ID_LEN)?;
        Ok(Self(raw))
    }
}

impl From<InstanceId> for String {
    fn from(id: InstanceId) -> Self {
        id.0
    }
}

impl AsRef<str> for InstanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

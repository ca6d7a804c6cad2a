use std::fmt;

use serde::{Deserialize, Serialize};

use super::{MAX_INSTANCE_ID_LEN, WorkflowKind, validate};
use crate::error::{ModelError, ModelResult};

/// Caller-supplied identifier of the tracked entity (a trip code).
///
/// Validated on construction: any key accepted here derives a legal instance id for every [`WorkflowKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BusinessKey(String);

impl BusinessKey {
    /// Longest key that still leaves room for a kind suffix.
    pub const MAX_LEN: usize = MAX_INSTANCE_ID_LEN - WorkflowKind::SUFFIX_LEN;

    /// Validate and wrap a business key.
    pub fn new(raw: impl Into<String>) -> ModelResult<Self> {
        Self::try_from(raw.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BusinessKey {
    type Error = ModelError;
    fn try_from(raw: String) -> ModelResult<Self> {
        validate(&raw, "business key", Self::MAX_LEN)?;
        Ok(Self(raw))
    }
}

impl From<BusinessKey> for String {
    fn from(k: BusinessKey) -> Self {
        k.0
    }
}

impl fmt::Display for BusinessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

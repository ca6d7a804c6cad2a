//! Stable instance identity derived from a business key.
//!
//! Identifiers follow the character rules of the durable backend namespace:
//! no `/`, `\`, `#`, `?`, no control characters, no surrounding whitespace,
//! and at most [`MAX_INSTANCE_ID_LEN`] characters in total.
mod key;
pub use key::BusinessKey;

mod instance;
pub use instance::InstanceId;

mod kind;
pub use kind::WorkflowKind;

use crate::error::{ModelError, ModelResult};

/// Upper bound on instance id length accepted by the backend.
pub const MAX_INSTANCE_ID_LEN: usize = 256;

/// Characters the backend reserves in instance ids.
const RESERVED: [char; 4] = ['/', '\\', '#', '?'];

/// Derive the instance id for `key` under the given workflow `kind`.
///
/// Pure and deterministic: the same inputs always yield the same id, so duplicate
/// triggers for one trip resolve to the same run.
/// Every kind appends a suffix of the same length, which keeps the mapping
/// injective over `(key, kind)` pairs.
///
/// ```rust
/// use tmon_model::{BusinessKey, WorkflowKind, derive};
///
/// let key = BusinessKey::new("TRIP123").unwrap();
/// assert_eq!(derive(&key, WorkflowKind::Monitor).as_str(), "TRIP123-M");
/// ```
pub fn derive(key: &BusinessKey, kind: WorkflowKind) -> InstanceId {
    let mut id = String::with_capacity(key.as_str().len() + kind.suffix().len());
    id.push_str(key.as_str());
    id.push_str(kind.suffix());
    InstanceId::from_derived(id)
}

/// Validate a raw identifier against the backend namespace rules.
///
/// `max_len` is counted in characters.
fn validate(raw: &str, what: &str, max_len: usize) -> ModelResult<()> {
    if raw.is_empty() {
        return Err(ModelError::InvalidKey(format!("{what} cannot be empty")));
    }
    if raw.trim() != raw {
        return Err(ModelError::InvalidKey(format!(
            "{what} '{raw}' has leading or trailing whitespace"
        )));
    }
    if let Some(bad) = raw.chars().find(|c| RESERVED.contains(c) || c.is_control()) {
        return Err(ModelError::InvalidKey(format!(
            "{what} '{}' contains illegal character {bad:?}",
            raw.escape_debug()
        )));
    }
    let len = raw.chars().count();
    if len > max_len {
        return Err(ModelError::InvalidKey(format!(
            "{what} is {len} characters long (max {max_len})"
        )));
    }
    Ok(())
}

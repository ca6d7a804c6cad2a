use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("tracker store unavailable: {0}")]
    Unavailable(String),

    #[error("tracker internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, TrackerError::Unavailable(_))
    }
}

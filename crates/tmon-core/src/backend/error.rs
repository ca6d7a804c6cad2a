use thiserror::Error;

/// Answers a backend can give besides success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Transport or service failure. Retryable.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// A live run already owns the instance id.
    #[error("instance is already live: {0}")]
    Conflict(String),

    /// Definitive refusal for any other reason.
    #[error("rejected: {0}")]
    Rejected(String),

    /// No such instance.
    #[error("instance not found")]
    NotFound,
}

impl BackendError {
    /// Label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Unavailable(_) => "unavailable",
            BackendError::Conflict(_) => "conflict",
            BackendError::Rejected(_) => "rejected",
            BackendError::NotFound => "not_found",
        }
    }
}

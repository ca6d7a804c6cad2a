use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("unknown workflow kind: {0}")]
    UnknownKind(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

use thiserror::Error;

/// Failure to configure or install the logger.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format '{0}', use text, json or journald")]
    InvalidFormat(String),

    #[error("journald output requires Linux")]
    JournaldNotSupported,

    #[error("cannot connect to journald: {0}")]
    JournaldInitFailed(String),

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,

    #[error("unknown timezone '{0}', use utc or local")]
    InvalidTimeZone(String),

    #[error("bad log filter {0}")]
    InvalidLevel(String),

    /// An environment override holds a value the logger cannot use.
    #[error("{var}: {source}")]
    EnvOverride {
        var: &'static str,
        source: Box<LoggerError>,
    },
}

impl LoggerError {
    /// Attribute `source` to the environment variable it was read from.
    pub(crate) fn env_override(var: &'static str) -> impl FnOnce(LoggerError) -> LoggerError {
        move |source| LoggerError::EnvOverride {
            var,
            source: Box::new(source),
        }
    }
}

pub type LoggerResult<T> = Result<T, LoggerError>;

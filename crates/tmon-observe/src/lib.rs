//! Logging setup shared by the tmon binaries.
mod config;
mod error;
mod log;
mod object;

pub use config::{ENV_LOG_FORMAT, ENV_LOG_LEVEL, LoggerConfig};
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, LoggerTimeZone, init_local_offset};

/// Install the global tracing subscriber described by `cfg`.
///
/// Every `tracing` macro in the process goes through this subscriber afterwards.
/// Can succeed only once per process.
///
/// `LoggerTimeZone::Local` needs [`init_local_offset`] to run in `main()` before any thread is spawned.
///
/// ```rust
/// use tmon_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default();
/// init_logger(&config).expect("failed to initialize logger");
/// tracing::info!("logger initialized");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => log::logger_text(cfg),
        LoggerFormat::Json => log::logger_json(cfg),
        LoggerFormat::Journald => log::logger_journald(cfg),
    }
}

use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::{
    error::{LoggerError, LoggerResult},
    object::{LoggerFormat, LoggerLevel, LoggerTimeZone},
};

/// Environment variable overriding [`LoggerConfig::level`].
pub const ENV_LOG_LEVEL: &str = "TMON_LOG";
/// Environment variable overriding [`LoggerConfig::format`].
pub const ENV_LOG_FORMAT: &str = "TMON_LOG_FORMAT";

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// Filter expression (e.g. `"info"`, `"tmon_core=debug,info"`).
    pub level: LoggerLevel,
    /// Timezone for timestamps.
    pub tz: LoggerTimeZone,
    /// Include module/target names in output.
    pub with_targets: bool,
    /// Colored output; only honored when stdout is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// `true` if color is enabled and stdout is a terminal.
    ///
    /// Call at initialization time, not while parsing config.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }

    /// Apply `TMON_LOG` / `TMON_LOG_FORMAT` on top of this config.
    pub fn with_env_overrides(self) -> LoggerResult<Self> {
        self.with_overrides(
            std::env::var(ENV_LOG_LEVEL).ok(),
            std::env::var(ENV_LOG_FORMAT).ok(),
        )
    }

    /// Apply level / format values taken from `TMON_LOG` / `TMON_LOG_FORMAT`.
    ///
    /// Blank values are ignored. Errors name the variable the bad value belongs to.
    pub fn with_overrides(
        mut self,
        level: Option<String>,
        format: Option<String>,
    ) -> LoggerResult<Self> {
        if let Some(level) = level.filter(|s| !s.trim().is_empty()) {
            self.level =
                LoggerLevel::new(level).map_err(LoggerError::env_override(ENV_LOG_LEVEL))?;
        }
        if let Some(format) = format.filter(|s| !s.trim().is_empty()) {
            self.format = format
                .parse()
                .map_err(LoggerError::env_override(ENV_LOG_FORMAT))?;
        }
        Ok(self)
    }
}

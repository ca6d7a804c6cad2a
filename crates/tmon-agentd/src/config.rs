use std::{net::SocketAddr, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use tmon_core::SupervisorConfig;
use tmon_observe::LoggerConfig;

/// Environment variable pointing at an optional JSON config file.
pub const ENV_CONFIG: &str = "TMON_CONFIG";

/// Daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentConfig {
    /// Address the HTTP API binds to.
    pub listen: SocketAddr,
    pub logger: LoggerConfig,
    pub supervisor: SupervisorConfig,
    /// Capacity of the queue trigger channel.
    pub queue_capacity: usize,
    /// Feed trip codes read from stdin, one per line, into the queue trigger.
    pub queue_from_stdin: bool,
    /// Keep a secondary record of started instances in memory.
    pub track_instances: bool,
    /// Promote new runs of the in-memory backend straight to `running`.
    pub auto_run: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            logger: LoggerConfig::default(),
            supervisor: SupervisorConfig::default(),
            queue_capacity: 256,
            queue_from_stdin: false,
            track_instances: true,
            auto_run: false,
        }
    }
}

impl AgentConfig {
    /// Load the config named by `TMON_CONFIG`, or defaults when unset.
    ///
    /// Logger env overrides are applied on top.
    pub fn load() -> anyhow::Result<Self> {
        let cfg = match std::env::var_os(ENV_CONFIG) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        cfg.with_logger_env()
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn with_logger_env(mut self) -> anyhow::Result<Self> {
        self.logger = self.logger.with_env_overrides()?;
        Ok(self)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.queue_capacity > 0, "queueCapacity must be greater than zero");
        anyhow::ensure!(
            self.supervisor.call_timeout_ms > 0,
            "supervisor.callTimeoutMs must be greater than zero"
        );
        Ok(())
    }
}

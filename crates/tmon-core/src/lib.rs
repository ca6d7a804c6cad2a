pub mod backend;
pub mod config;
pub mod error;
pub mod metrics;
pub mod supervisor;
pub mod tracker;

pub use backend::{BackendError, BackendHandle, DurableBackend, InMemoryBackend, InstanceSnapshot};
pub use config::SupervisorConfig;
pub use error::SupervisorError;
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, noop_metrics};
pub use supervisor::MonitorSupervisor;
pub use tracker::{
    InstanceTracker, MemoryTracker, NoOpTracker, TrackerError, TrackerHandle, noop_tracker,
};

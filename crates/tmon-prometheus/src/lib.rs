//! Prometheus metrics backend for the tmon supervisor.
//!
//! [`PrometheusMetrics`] implements [`tmon_core::MetricsBackend`]; inject it with
//! [`tmon_core::MonitorSupervisor::with_metrics`] and expose [`PrometheusMetrics::gather`] on a `/metrics` route.
//!
//! ## Metrics
//! - `tmon_start_decisions_total{kind, decision}` - Counter
//! - `tmon_terminate_outcomes_total{kind, outcome}` - Counter
//! - `tmon_backend_errors_total{op, error_kind}` - Counter
//! - `tmon_tracker_errors_total{op}` - Counter
//!
//! ```rust
//! use std::sync::Arc;
//! use tmon_core::{InMemoryBackend, MonitorSupervisor, SupervisorConfig};
//! use tmon_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let supervisor = MonitorSupervisor::new(
//!     Arc::new(InMemoryBackend::new()),
//!     &SupervisorConfig::default(),
//! )?
//! .with_metrics(Arc::new(metrics.clone()));
//! # let _ = supervisor;
//! let text = metrics.encode_text()?;
//! # let _ = text;
//! # Ok(())
//! # }
//! ```

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};

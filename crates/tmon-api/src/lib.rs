//! Trigger adapters for the trip monitor supervisor.
//! - [`HttpApi`]: axum routes for start / status / terminate / list.
//! - [`QueueTrigger`]: starts monitors for trip codes read from a channel.
//!
//! Both talk to an [`ApiHandler`]; [`SupervisorAdapter`] is the stock implementation over [`tmon_core::MonitorSupervisor`].
mod adapter;
pub use adapter::SupervisorAdapter;

mod error;
pub use error::ApiError;

mod handler;
pub use handler::ApiHandler;

mod http;
pub use http::{DEFAULT_TERMINATE_REASON, HttpApi};

mod queue;
pub use queue::{QueueStats, QueueTrigger};

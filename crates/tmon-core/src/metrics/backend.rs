use std::sync::Arc;

/// Metrics collection interface used by the supervisor.
///
/// All label values passed in are drawn from small closed sets
/// (workflow kind names, decision / outcome labels, backend error kinds).
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record the decision taken by `ensure_started`.
    ///
    /// # Arguments
    /// - `kind`: workflow kind (`monitor`, `manager`, `demo`)
    /// - `decision`: `started`, `already_running` or `start_failed`
    fn record_start(&self, kind: &str, decision: &str);

    /// Record the outcome of a terminate request.
    ///
    /// # Arguments
    /// - `kind`: workflow kind
    /// - `outcome`: `terminated`, `not_found` or `terminate_failed`
    fn record_terminate(&self, kind: &str, outcome: &str);

    /// Record a backend call that failed or timed out.
    ///
    /// # Arguments
    /// - `op`: `get_status`, `start` or `terminate`
    /// - `error_kind`: backend error label or `timeout`
    fn record_backend_error(&self, op: &str, error_kind: &str);

    /// Record a swallowed tracker failure.
    ///
    /// # Arguments
    /// - `op`: `track` or `untrack`
    fn record_tracker_error(&self, op: &str);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;

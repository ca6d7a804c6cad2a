use std::sync::Arc;

use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder, proto::MetricFamily};

use tmon_core::MetricsBackend;

const NAMESPACE: &str = "tmon";

/// Prometheus metrics backend.
///
/// All labels are bounded:
/// - `kind`: "monitor", "manager", "demo"
/// - `decision`: "started", "already_running", "start_failed"
/// - `outcome`: "terminated", "not_found", "terminate_failed"
/// - `op`: "get_status", "start", "terminate", "track", "untrack"
/// - `error_kind`: "unavailable", "conflict", "rejected", "not_found", "timeout"
#[derive(Clone)]
pub struct PrometheusMetrics {
    start_decisions: CounterVec,
    terminate_outcomes: CounterVec,
    backend_errors: CounterVec,
    tracker_errors: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Register all counters in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let start_decisions = counter(
            &registry,
            "start_decisions_total",
            "Decisions taken by ensure_started",
            &["kind", "decision"],
        )?;
        let terminate_outcomes = counter(
            &registry,
            "terminate_outcomes_total",
            "Outcomes of terminate requests",
            &["kind", "outcome"],
        )?;
        let backend_errors = counter(
            &registry,
            "backend_errors_total",
            "Backend calls that failed or timed out",
            &["op", "error_kind"],
        )?;
        let tracker_errors = counter(
            &registry,
            "tracker_errors_total",
            "Swallowed secondary persistence failures",
            &["op"],
        )?;

        Ok(Self {
            start_decisions,
            terminate_outcomes,
            backend_errors,
            tracker_errors,
            registry,
        })
    }

    /// Register all counters in a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metric families for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render all metrics in the text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

fn counter(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<CounterVec, prometheus::Error> {
    let c = CounterVec::new(Opts::new(name, help).namespace(NAMESPACE), labels)?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

impl MetricsBackend for PrometheusMetrics {
    fn record_start(&self, kind: &str, decision: &str) {
        self.start_decisions
            .with_label_values(&[kind, decision])
            .inc();
    }

    fn record_terminate(&self, kind: &str, outcome: &str) {
        self.terminate_outcomes
            .with_label_values(&[kind, outcome])
            .inc();
    }

    fn record_backend_error(&self, op: &str, error_kind: &str) {
        self.backend_errors
            .with_label_values(&[op, error_kind])
            .inc();
    }

    fn record_tracker_error(&self, op: &str) {
        self.tracker_errors.with_label_values(&[op]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(text: &str, name: &str) -> usize {
        text.lines()
            .filter(|l| l.starts_with(&format!("{name}{{")))
            .count()
    }

    #[test]
    fn start_decisions_are_labelled() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_start("monitor", "started");
        metrics.record_start("monitor", "already_running");
        metrics.record_start("monitor", "already_running");

        let text = metrics.encode_text().unwrap();
        assert_eq!(series(&text, "tmon_start_decisions_total"), 2);
        let repeated = text
            .lines()
            .find(|l| l.contains(r#"decision="already_running""#))
            .expect("already_running series");
        assert!(repeated.ends_with(" 2"), "{repeated}");
    }

    #[test]
    fn terminate_and_error_counters_are_exposed() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_terminate("monitor", "terminated");
        metrics.record_backend_error("start", "timeout");
        metrics.record_tracker_error("track");

        let text = metrics.encode_text().unwrap();
        assert_eq!(series(&text, "tmon_terminate_outcomes_total"), 1);
        assert_eq!(series(&text, "tmon_backend_errors_total"), 1);
        assert_eq!(series(&text, "tmon_tracker_errors_total"), 1);
    }

    #[test]
    fn custom_registry_is_used() {
        let registry = Arc::new(Registry::new());
        let metrics = PrometheusMetrics::new_with_registry(registry.clone()).unwrap();

        metrics.record_start("monitor", "started");
        assert!(!registry.gather().is_empty());
    }

    #[test]
    fn registering_twice_in_one_registry_fails() {
        let registry = Arc::new(Registry::new());
        PrometheusMetrics::new_with_registry(registry.clone()).unwrap();
        assert!(PrometheusMetrics::new_with_registry(registry).is_err());
    }
}

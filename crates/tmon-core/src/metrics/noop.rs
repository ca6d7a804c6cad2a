use crate::metrics::backend::MetricsBackend;

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_start(&self, _: &str, _: &str) {}

    #[inline(always)]
    fn record_terminate(&self, _: &str, _: &str) {}

    #[inline(always)]
    fn record_backend_error(&self, _: &str, _: &str) {}

    #[inline(always)]
    fn record_tracker_error(&self, _: &str) {}
}

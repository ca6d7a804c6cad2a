use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use tmon_model::StartDecision;

use crate::handler::ApiHandler;

/// Counters reported when a [`QueueTrigger`] stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    /// Messages taken off the channel.
    pub received: u64,
    /// Messages that started a new run.
    pub started: u64,
    /// Empty messages and messages whose run was already live.
    pub skipped: u64,
    /// Messages that ended in an error or a rejected start.
    pub failed: u64,
}

/// Starts trip monitors for trip codes delivered over a channel.
///
/// Each message is one trip code. Failures are logged and the message is dropped;
/// redelivery is the producer's concern.
pub struct QueueTrigger<H> {
    handler: Arc<H>,
    rx: mpsc::Receiver<String>,
    cancel: Option<CancellationToken>,
}

impl<H> QueueTrigger<H>
where
    H: ApiHandler,
{
    pub fn new(handler: Arc<H>, rx: mpsc::Receiver<String>) -> Self {
        Self {
            handler,
            rx,
            cancel: None,
        }
    }

    /// Stop consuming when `token` is cancelled.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Consume messages until the channel closes or the token fires.
    pub async fn run(mut self) -> QueueStats {
        let mut stats = QueueStats::default();
        let cancel = self.cancel.take().unwrap_or_default();

        info!("queue trigger started");
        loop {
            let msg = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("queue trigger cancelled");
                    break;
                }
                msg = self.rx.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
            };
            stats.received += 1;
            self.handle(msg.trim(), &mut stats).await;
        }
        info!(
            received = stats.received,
            started = stats.started,
            skipped = stats.skipped,
            failed = stats.failed,
            "queue trigger stopped"
        );
        stats
    }

    async fn handle(&self, code: &str, stats: &mut QueueStats) {
        if code.is_empty() {
            warn!("empty trip code in queue message, dropped");
            stats.skipped += 1;
            return;
        }

        match self.handler.ensure_started(code).await {
            Ok(StartDecision::Started { instance_id }) => {
                debug!(%code, instance = %instance_id, "trip monitor started from queue");
                stats.started += 1;
            }
            Ok(StartDecision::AlreadyRunning {
                instance_id,
                status,
            }) => {
                debug!(
                    %code,
                    instance = %instance_id,
                    status = status.map_or("unreported", |s| s.as_str()),
                    "trip monitor already live"
                );
                stats.skipped += 1;
            }
            Ok(StartDecision::StartFailed {
                instance_id,
                reason,
            }) => {
                error!(%code, instance = %instance_id, %reason, "trip monitor start rejected");
                stats.failed += 1;
            }
            Err(e) => {
                error!(%code, error = %e, retryable = e.is_retryable(), "trip monitor start failed");
                stats.failed += 1;
            }
        }
    }
}

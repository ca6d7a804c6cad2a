use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use tmon_api::{HttpApi, QueueTrigger, SupervisorAdapter};
use tmon_core::{DurableBackend, InMemoryBackend, MemoryTracker, MonitorSupervisor};
use tmon_observe::{init_local_offset, init_logger};
use tmon_prometheus::PrometheusMetrics;

mod config;
use config::AgentConfig;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

fn main() -> anyhow::Result<()> {
    // Must run before the runtime spawns its workers.
    init_local_offset();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run())
}

async fn run() -> anyhow::Result<()> {
    // 1) config + logger
    let cfg = AgentConfig::load()?;
    init_logger(&cfg.logger)?;
    info!(listen = %cfg.listen, "logger initialized");

    // 2) supervisor
    let metrics = Arc::new(PrometheusMetrics::new()?);
    let backend = Arc::new(InMemoryBackend::new().with_auto_run(cfg.auto_run));
    info!(
        backend = backend.name(),
        auto_run = cfg.auto_run,
        track_instances = cfg.track_instances,
        "supervisor backend ready"
    );
    let mut supervisor =
        MonitorSupervisor::new(backend, &cfg.supervisor)?.with_metrics(metrics.clone());
    if cfg.track_instances {
        supervisor = supervisor.with_tracker(Arc::new(MemoryTracker::new()));
    }
    info!(kind = %supervisor.kind(), "supervisor ready");
    let handler = Arc::new(SupervisorAdapter::new(Arc::new(supervisor)));

    let shutdown = CancellationToken::new();

    // 3) queue trigger
    let (tx, rx) = mpsc::channel(cfg.queue_capacity);
    let queue = tokio::spawn(
        QueueTrigger::new(handler.clone(), rx)
            .with_cancel(shutdown.clone())
            .run(),
    );
    if cfg.queue_from_stdin {
        tokio::spawn(feed_stdin(tx, shutdown.clone()));
    } else {
        // Keep the channel open until shutdown.
        let token = shutdown.clone();
        tokio::spawn(async move {
            token.cancelled().await;
            drop(tx);
        });
    }

    // 4) http
    let app = HttpApi::new(handler).router().merge(
        Router::new()
            .route("/metrics", get(metrics_text))
            .with_state(metrics),
    );
    let listener = tokio::net::TcpListener::bind(cfg.listen).await?;
    info!(addr = %listener.local_addr()?, "http api listening");

    tokio::spawn(wait_for_signal(shutdown.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await?;

    shutdown.cancel();
    let stats = queue.await?;
    info!(
        received = stats.received,
        started = stats.started,
        "shutdown complete"
    );
    Ok(())
}

async fn wait_for_signal(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("ctrl-c received, shutting down"),
        Err(e) => error!(error = %e, "failed to listen for ctrl-c, shutting down"),
    }
    shutdown.cancel();
}

/// Forward stdin lines to the queue trigger until EOF or shutdown.
async fn feed_stdin(tx: mpsc::Sender<String>, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line,
        };
        match line {
            Ok(Some(code)) => {
                if tx.send(code).await.is_err() {
                    break;
                }
            }
            Ok(None) => {
                info!("stdin closed, queue feed stopped");
                break;
            }
            Err(e) => {
                warn!(error = %e, "failed to read stdin, queue feed stopped");
                break;
            }
        }
    }
}

/// GET /metrics
async fn metrics_text(State(metrics): State<Arc<PrometheusMetrics>>) -> impl IntoResponse {
    match metrics.encode_text() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

use std::{sync::Arc, time::UNIX_EPOCH};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use tmon_model::{InstanceId, InstanceRecord, RunStatus, StartDecision, TerminateOutcome};

use crate::{error::ApiError, handler::ApiHandler};

/// Reason recorded when a terminate request does not carry one.
pub const DEFAULT_TERMINATE_REASON: &str = "Via an API request";

const BASE: &str = "/api/v1/tripmonitors";

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build the axum router.
    ///
    /// Routes:
    /// - POST /api/v1/tripmonitors/{code} - Start the monitor of a trip
    /// - GET /api/v1/tripmonitors/{instance_id} - Instance status
    /// - POST /api/v1/tripmonitors/{instance_id}/terminate?reason=.. - Terminate an instance
    /// - GET /api/v1/tripmonitors - Tracked instances
    pub fn router(self) -> Router {
        // Start and status share a path segment, so both use the `{key}` capture.
        Router::new()
            .route(BASE, get(list_tracked::<H>))
            .route(
                &format!("{BASE}/{{key}}"),
                post(start_monitor::<H>).get(get_status::<H>),
            )
            .route(&format!("{BASE}/{{key}}/terminate"), post(terminate::<H>))
            .with_state(self.handler)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct StartResponse {
    instance_id: String,
    started: bool,
    /// Backend status of the live run that made the start a no-op, when the backend reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<RunStatus>,
    /// Where to poll for the instance status.
    status_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<StartDecision> for StartResponse {
    fn from(d: StartDecision) -> Self {
        let status_url = status_url(d.instance_id());
        match d {
            StartDecision::Started { instance_id } => Self {
                instance_id: instance_id.into(),
                started: true,
                status: None,
                status_url,
                error: None,
            },
            StartDecision::AlreadyRunning {
                instance_id,
                status,
            } => Self {
                instance_id: instance_id.into(),
                started: false,
                status,
                status_url,
                error: None,
            },
            StartDecision::StartFailed {
                instance_id,
                reason,
            } => Self {
                instance_id: instance_id.into(),
                started: false,
                status: None,
                status_url,
                error: Some(reason),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    instance_id: String,
    status: RunStatus,
}

#[derive(Debug, Deserialize)]
struct TerminateQuery {
    reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TerminateResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct TrackedInstance {
    instance_id: String,
    business_key: String,
    /// Seconds since the Unix epoch.
    created_at: u64,
}

impl From<InstanceRecord> for TrackedInstance {
    fn from(r: InstanceRecord) -> Self {
        Self {
            instance_id: r.instance_id.into(),
            business_key: r.business_key.into(),
            created_at: r
                .created_at
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct ListResponse {
    instances: Vec<TrackedInstance>,
}

fn status_url(id: &InstanceId) -> String {
    format!("{BASE}/{id}")
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/tripmonitors/{code}
async fn start_monitor<H>(
    State(handler): State<Arc<H>>,
    Path(code): Path<String>,
) -> Result<Json<StartResponse>, ApiError>
where
    H: ApiHandler,
{
    let decision = handler.ensure_started(&code).await.inspect_err(|e| {
        error!(code = %code, error = %e, "start trip monitor failed");
    })?;
    Ok(Json(decision.into()))
}

/// GET /api/v1/tripmonitors/{instance_id}
async fn get_status<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError>
where
    H: ApiHandler,
{
    let id = InstanceId::parse(id)?;
    let status = handler.get_status(&id).await?;

    Ok(Json(StatusResponse {
        instance_id: id.into(),
        status,
    }))
}

/// POST /api/v1/tripmonitors/{instance_id}/terminate
async fn terminate<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
    Query(query): Query<TerminateQuery>,
) -> Result<Json<TerminateResponse>, ApiError>
where
    H: ApiHandler,
{
    let id = InstanceId::parse(id)?;
    let reason = query
        .reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TERMINATE_REASON.to_string());

    let outcome = handler.terminate(&id, &reason).await.inspect_err(|e| {
        error!(instance = %id, error = %e, "terminate trip monitor failed");
    })?;

    match outcome {
        TerminateOutcome::Terminated => Ok(Json(TerminateResponse {
            ok: true,
            error: None,
        })),
        TerminateOutcome::NotFound => Err(ApiError::NotFound(id.into())),
        TerminateOutcome::TerminateFailed(reason) => Ok(Json(TerminateResponse {
            ok: false,
            error: Some(reason),
        })),
    }
}

/// GET /api/v1/tripmonitors
async fn list_tracked<H>(State(handler): State<Arc<H>>) -> Result<Json<ListResponse>, ApiError>
where
    H: ApiHandler,
{
    let instances = handler
        .list_tracked()
        .await?
        .into_iter()
        .map(TrackedInstance::from)
        .collect();

    Ok(Json(ListResponse { instances }))
}

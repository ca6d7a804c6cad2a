use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use tmon_core::SupervisorError;
use tmon_model::ModelError;

/// Errors returned by the trigger adapters.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Transient; the caller should retry.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Transient; the caller should retry.
    #[error("timeout: {0}")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable kind reported in the `error` field of HTTP bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::Timeout(_) => "timeout",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Unavailable(_) | ApiError::Timeout(_))
    }
}

impl From<SupervisorError> for ApiError {
    fn from(e: SupervisorError) -> Self {
        let msg = e.to_string();
        match e {
            SupervisorError::InvalidKey(_) => ApiError::InvalidRequest(msg),
            SupervisorError::NotFound(_) => ApiError::NotFound(msg),
            SupervisorError::BackendUnavailable(_) => ApiError::Unavailable(msg),
            SupervisorError::Timeout { .. } => ApiError::Timeout(msg),
            SupervisorError::Tracker(ref t) if t.is_retryable() => ApiError::Unavailable(msg),
            SupervisorError::BackendRejected(_)
            | SupervisorError::Tracker(_)
            | SupervisorError::Config(_) => ApiError::Internal(msg),
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(e: ModelError) -> Self {
        ApiError::InvalidRequest(e.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmon_model::InstanceId;

    #[test]
    fn supervisor_errors_map_to_http_statuses() {
        let cases = [
            (
                SupervisorError::InvalidKey("empty".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                SupervisorError::NotFound(InstanceId::parse("X-M").unwrap()),
                StatusCode::NOT_FOUND,
            ),
            (
                SupervisorError::BackendUnavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                SupervisorError::Timeout {
                    op: "start",
                    timeout_ms: 10,
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                SupervisorError::BackendRejected("nope".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status_code(), status, "{api}");
        }
    }

    #[test]
    fn retryable_errors_stay_retryable() {
        let err = ApiError::from(SupervisorError::Timeout {
            op: "get_status",
            timeout_ms: 5,
        });
        assert!(err.is_retryable());
        assert!(!ApiError::from(SupervisorError::InvalidKey("x".into())).is_retryable());
    }

    #[tokio::test]
    async fn not_found_body_carries_error_kind() {
        let resp = ApiError::NotFound("TRIP1-M".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["error"], "not_found");
    }
}

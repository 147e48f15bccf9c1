//! Health check endpoint handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use patient_index_persistence::core::PatientStorage;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::RestResult;
use crate::state::{AppState, PatientIndexBackend};

/// Body of the health check response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Always `healthy` when the store answers.
    pub status: &'static str,
    /// Storage backend name.
    pub backend: &'static str,
    /// Number of stored records, active or not.
    pub patients: u64,
    /// Time of the check (RFC 3339).
    pub timestamp: String,
}

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET [base]/health`
///
/// # Response
///
/// - `200 OK` - Backend name and current record count
pub async fn health_handler<S>(State(state): State<AppState<S>>) -> RestResult<Response>
where
    S: PatientIndexBackend,
{
    debug!("Processing health check request");

    let body = HealthStatus {
        status: "healthy",
        backend: state.storage().backend_name(),
        patients: state.storage().count().await?,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Liveness probe: the process is up.
///
/// `GET [base]/_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe: the store answers queries.
///
/// `GET [base]/_readiness`
pub async fn readiness_handler<S>(State(state): State<AppState<S>>) -> Response
where
    S: PatientIndexBackend,
{
    match state.storage().count().await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready", "checks": { "storage": "ok" } })),
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable", "checks": { "storage": "error" } })),
            )
                .into_response()
        }
    }
}

//! Route table.

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::{AppState, PatientIndexBackend};

/// Creates every route served by the patient index.
///
/// # Routes
///
/// ## Patient
/// - `GET /Patient` - Search
/// - `POST /Patient` - Create
/// - `POST /Patient/$merge` - Merge two records
/// - `GET /Patient/{id}` - Read
/// - `PUT /Patient/{id}` - Update or create with a client id
/// - `GET /Patient/{id}/_history` - Instance history
/// - `GET /Patient/{id}/_history/{vid}` - Version read
///
/// ## Other
/// - `POST {pix_path}` - HL7v3 PIX query (default `/ws/pix`)
/// - `GET /AuditEvent` - Audit trail
/// - `GET /health`, `/_liveness`, `/_readiness` - Probes
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: PatientIndexBackend,
{
    let pix_path = state.config().pix_path.clone();

    Router::new()
        // Probes
        .route("/health", get(handlers::health_handler::<S>))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/_readiness", get(handlers::readiness_handler::<S>))
        // Type-level routes
        .route(
            "/Patient",
            get(handlers::search_handler::<S>).post(handlers::create_handler::<S>),
        )
        .route("/Patient/$merge", post(handlers::merge_handler::<S>))
        // Instance-level routes
        .route(
            "/Patient/{id}",
            get(handlers::read_handler::<S>).put(handlers::update_handler::<S>),
        )
        .route("/Patient/{id}/_history", get(handlers::history_handler::<S>))
        .route(
            "/Patient/{id}/_history/{version_id}",
            get(handlers::vread_handler::<S>),
        )
        .route("/AuditEvent", get(handlers::audit_handler::<S>))
        .route(&pix_path, post(handlers::pix_query_handler::<S>))
        .with_state(state)
}

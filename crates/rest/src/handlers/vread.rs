//! Version read (vread) interaction handler.
//!
//! Implements the FHIR [vread interaction](https://hl7.org/fhir/http.html#vread):
//! `GET [base]/Patient/[id]/_history/[vid]`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use patient_index_persistence::core::{AuditStorage, VersionedStorage};
use patient_index_persistence::types::{AuditEntry, AuditOperation};
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::resources::patient_to_json;
use crate::responses::{ResourceHeaders, resource_response};
use crate::state::{AppState, PatientIndexBackend};

/// Handler for the vread interaction.
///
/// # HTTP Request
///
/// `GET [base]/Patient/[id]/_history/[vid]`
///
/// # Response
///
/// - `200 OK` - The requested version
/// - `404 Not Found` - Unknown record, or a version it never had
pub async fn vread_handler<S>(
    State(state): State<AppState<S>>,
    Path((id, version_id)): Path<(String, String)>,
) -> RestResult<Response>
where
    S: PatientIndexBackend,
{
    debug!(id = %id, version_id = %version_id, "Processing vread request");

    let version = version_id
        .parse::<u64>()
        .map_err(|_| RestError::VersionNotFound {
            id: id.clone(),
            version_id: version_id.clone(),
        })?;

    let record = state.storage().vread(&id, version).await?;

    state
        .storage()
        .record_audit(AuditEntry::new(AuditOperation::Read, record.id()))
        .await?;

    Ok(resource_response(
        StatusCode::OK,
        ResourceHeaders::from_record(&record).to_header_map(),
        patient_to_json(&record),
    ))
}

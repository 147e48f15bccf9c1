//! Read interaction handler.
//!
//! Implements the FHIR [read interaction](https://hl7.org/fhir/http.html#read):
//! `GET [base]/Patient/[id]`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use patient_index_persistence::core::{AuditStorage, PatientStorage};
use patient_index_persistence::types::{AuditEntry, AuditOperation};
use tracing::debug;

use crate::error::RestResult;
use crate::resources::patient_to_json;
use crate::responses::{ResourceHeaders, resource_response};
use crate::state::{AppState, PatientIndexBackend};

/// Handler for the read interaction.
///
/// Returns the current version of a record, active or not. Every successful
/// read is recorded in the audit trail.
///
/// # HTTP Request
///
/// `GET [base]/Patient/[id]`
///
/// # Response
///
/// - `200 OK` - Record found
/// - `404 Not Found` - No record with this id
pub async fn read_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    S: PatientIndexBackend,
{
    debug!(id = %id, "Processing read request");

    let record = state.storage().read(&id).await?;

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

//! Update interaction handler.
//!
//! Implements the FHIR [update interaction](https://hl7.org/fhir/http.html#update):
//! `PUT [base]/Patient/[id]`
//!
//! Update-as-create is supported: a PUT to an unused id creates the record
//! with that id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use patient_index_persistence::core::PatientStorage;
use tracing::{debug, info};

use crate::error::{RestError, RestResult};
use crate::extractors::FhirResource;
use crate::resources::{body_id, patient_data_from_json, patient_to_json};
use crate::responses::{ResourceHeaders, resource_response};
use crate::state::{AppState, PatientIndexBackend};

/// Handler for the update interaction.
///
/// # HTTP Request
///
/// `PUT [base]/Patient/[id]`
///
/// The body must carry an `id` equal to the one in the URL.
///
/// # Response
///
/// - `200 OK` - Existing record updated
/// - `201 Created` - New record created with the given id
/// - `400 Bad Request` - Invalid body, or id mismatch
/// - `409 Conflict` - An identifier is held by another active record
/// - `422 Unprocessable Entity` - The record has been merged away
pub async fn update_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    FhirResource(resource): FhirResource,
) -> RestResult<Response>
where
    S: PatientIndexBackend,
{
    debug!(id = %id, "Processing update request");

    match body_id(&resource) {
        Some(body_id) if body_id == id => {}
        Some(body_id) => {
            return Err(RestError::bad_request(format!(
                "Resource ID in body ({}) does not match URL ({})",
                body_id, id
            )));
        }
        None => {
            return Err(RestError::bad_request("Resource ID is required for update"));
        }
    }

    let data = patient_data_from_json(&resource)?;
    let (record, created) = state.storage().create_or_update(&id, data).await?;

    let headers = ResourceHeaders::from_record(&record);
    let (status, headers) = if created {
        info!(id = %record.id(), "Patient created via update");
        let location = format!(
            "{}/_history/{}",
            state.patient_url(record.id()),
            record.version_id()
        );
        (StatusCode::CREATED, headers.with_location(location))
    } else {
        info!(id = %record.id(), version = %record.version_id(), "Patient updated");
        (StatusCode::OK, headers)
    };

    Ok(resource_response(
        status,
        headers.to_header_map(),
        patient_to_json(&record),
    ))
}

//! Create interaction handler.
//!
//! Implements the FHIR [create interaction](https://hl7.org/fhir/http.html#create):
//! `POST [base]/Patient`

use axum::{extract::State, http::StatusCode, response::Response};
use patient_index_persistence::core::PatientStorage;
use tracing::{debug, info};

use crate::error::RestResult;
use crate::extractors::FhirResource;
use crate::resources::{body_id, patient_data_from_json, patient_to_json};
use crate::responses::{ResourceHeaders, resource_response};
use crate::state::{AppState, PatientIndexBackend};

/// Handler for the create interaction.
///
/// The server assigns the id; an id in the body is ignored.
///
/// # HTTP Request
///
/// `POST [base]/Patient`
///
/// # Response
///
/// - `201 Created` - Record created, with `Location`, `ETag` and `Last-Modified`
/// - `400 Bad Request` - Body is not a valid Patient
/// - `409 Conflict` - An identifier is held by another active record
/// - `415 Unsupported Media Type` - Body is not JSON
///
/// # Example
///
/// ```http
/// POST /Patient HTTP/1.1
/// Content-Type: application/fhir+json
///
/// {"resourceType": "Patient", "identifier": [{"system": "urn:oid:1.1", "value": "A"}]}
/// ```
pub async fn create_handler<S>(
    State(state): State<AppState<S>>,
    FhirResource(resource): FhirResource,
) -> RestResult<Response>
where
    S: PatientIndexBackend,
{
    debug!(
        body_id = ?body_id(&resource),
        "Processing create request"
    );

    let data = patient_data_from_json(&resource)?;
    let record = state.storage().create(data, None).await?;

    info!(
        id = %record.id(),
        identifiers = record.identifiers().len(),
        "Patient created"
    );

    let location = format!(
        "{}/_history/{}",
        state.patient_url(record.id()),
        record.version_id()
    );
    let headers = ResourceHeaders::from_record(&record).with_location(location);

    Ok(resource_response(
        StatusCode::CREATED,
        headers.to_header_map(),
        patient_to_json(&record),
    ))
}

//! `$merge` operation handler.
//!
//! `POST [base]/Patient/$merge` with a Parameters body naming a
//! `source-patient` and a `target-patient`. The source gets a new version,
//! inactive and linked to the target with `replaced-by`. The target is not
//! changed.

use axum::{extract::State, http::StatusCode, response::Response};
use patient_index_persistence::core::MergeStorage;
use tracing::{debug, info};

use crate::error::RestResult;
use crate::extractors::FhirResource;
use crate::resources::{MergeRequest, merge_response};
use crate::responses::{ResourceHeaders, resource_response};
use crate::state::{AppState, PatientIndexBackend};

/// Handler for the `$merge` operation.
///
/// # Response
///
/// - `200 OK` - Parameters with both records after the merge
/// - `400 Bad Request` - Missing or malformed parameters
/// - `422 Unprocessable Entity` - Unknown source or target, self-merge, or an
///   inactive record
pub async fn merge_handler<S>(
    State(state): State<AppState<S>>,
    resource: FhirResource,
) -> RestResult<Response>
where
    S: PatientIndexBackend,
{
    let request = MergeRequest::from_parameters(&resource.into_inner())?;

    debug!(
        source = %request.source_id,
        target = %request.target_id,
        "Processing merge request"
    );

    let result = state
        .storage()
        .merge(&request.source_id, &request.target_id)
        .await?;

    info!(
        source = %result.source.id(),
        target = %result.target.id(),
        target_version = %result.target.version_id(),
        "Patients merged"
    );

    Ok(resource_response(
        StatusCode::OK,
        ResourceHeaders::new().to_header_map(),
        merge_response(&result),
    ))
}

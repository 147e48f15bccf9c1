//! Search interaction handler.
//!
//! Implements the FHIR [search interaction](https://hl7.org/fhir/http.html#search):
//! `GET [base]/Patient?[parameters]`
//!
//! See [`PatientSearchParams`] for the supported parameters.

use axum::{extract::State, response::Response};
use patient_index_persistence::core::{AuditStorage, PatientSearch};
use patient_index_persistence::types::{AuditEntry, AuditOperation};
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::PatientSearchParams;
use crate::resources::patient_to_json;
use crate::responses::{BundleBuilder, BundleEntry, fhir_json};
use crate::state::{AppState, PatientIndexBackend};

/// Handler for Patient search.
///
/// Returns a `searchset` Bundle. Each matching record gets a Search entry
/// in the audit trail carrying the query string.
///
/// # Response
///
/// - `200 OK` - Bundle of matches, possibly empty
/// - `400 Bad Request` - Malformed parameter value
pub async fn search_handler<S>(
    State(state): State<AppState<S>>,
    params: PatientSearchParams,
) -> RestResult<Response>
where
    S: PatientIndexBackend,
{
    debug!(query = %params.raw(), "Processing search request");

    let matches = state.storage().search(params.query()).await?;

    debug!(count = matches.len(), "Search complete");

    let mut bundle = BundleBuilder::searchset().self_link(self_link(&state, params.raw()));
    for record in &matches {
        state
            .storage()
            .record_audit(
                AuditEntry::new(AuditOperation::Search, record.id()).with_query(params.raw()),
            )
            .await?;
        bundle = bundle.add_entry(BundleEntry::search_result(
            patient_to_json(record),
            state.patient_url(record.id()),
        ));
    }

    Ok(fhir_json(bundle.build()))
}

fn self_link<S: PatientIndexBackend>(state: &AppState<S>, raw: &str) -> String {
    if raw.is_empty() {
        format!("{}/Patient", state.base_url())
    } else {
        format!("{}/Patient?{}", state.base_url(), raw)
    }
}

//! History interaction handler.
//!
//! Implements the FHIR [history interaction](https://hl7.org/fhir/http.html#history)
//! for a single record: `GET [base]/Patient/[id]/_history`

use axum::{
    extract::{Path, State},
    response::Response,
};
use patient_index_persistence::core::VersionedStorage;
use patient_index_persistence::types::PatientRecord;
use tracing::debug;

use crate::error::RestResult;
use crate::resources::patient_to_json;
use crate::responses::bundle::HistoryEntryTransaction;
use crate::responses::{BundleBuilder, BundleEntry, fhir_json};
use crate::state::{AppState, PatientIndexBackend};

/// Handler for instance history.
///
/// Returns every version of the record, newest first, as a `history` Bundle.
///
/// # Response
///
/// - `200 OK` - Bundle of versions
/// - `404 Not Found` - No record with this id
pub async fn history_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    S: PatientIndexBackend,
{
    debug!(id = %id, "Processing instance history request");

    let versions = state.storage().history(&id).await?;

    let mut bundle = BundleBuilder::history();
    for (i, record) in versions.iter().enumerate() {
        // versions are newest first; the next element is the prior version
        let transaction = transaction_for(record, versions.get(i + 1));
        let full_url = format!("{}/_history/{}", state.patient_url(record.id()), record.version_id());
        bundle = bundle.add_entry(BundleEntry::history(
            patient_to_json(record),
            full_url,
            transaction,
        ));
    }

    Ok(fhir_json(bundle.build()))
}

/// Reconstructs the interaction that produced a version.
fn transaction_for(record: &PatientRecord, prior: Option<&PatientRecord>) -> HistoryEntryTransaction {
    let (method, url, status) = match prior {
        None => ("POST", "Patient".to_string(), "201 Created"),
        Some(prior) if record.links().len() > prior.links().len() => {
            ("POST", "Patient/$merge".to_string(), "200 OK")
        }
        Some(_) => ("PUT", format!("Patient/{}", record.id()), "200 OK"),
    };

    HistoryEntryTransaction {
        method,
        url,
        status: status.to_string(),
        etag: format!("W/\"{}\"", record.version_id()),
        last_modified: record.last_updated().to_rfc3339(),
    }
}

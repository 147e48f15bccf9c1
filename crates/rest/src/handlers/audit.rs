//! Audit trail endpoint.
//!
//! `GET [base]/AuditEvent[?patient=Patient/[id]]` returns audit entries as a
//! `searchset` of AuditEvent resources, oldest first.

use axum::{
    extract::{RawQuery, State},
    response::Response,
};
use patient_index_persistence::core::AuditStorage;
use tracing::debug;

use crate::error::RestResult;
use crate::resources::audit_event_to_json;
use crate::responses::{BundleBuilder, BundleEntry, fhir_json};
use crate::state::{AppState, PatientIndexBackend};

/// Handler for AuditEvent search.
///
/// The `patient` parameter accepts `Patient/[id]` or a bare id.
pub async fn audit_handler<S>(
    State(state): State<AppState<S>>,
    RawQuery(raw): RawQuery,
) -> RestResult<Response>
where
    S: PatientIndexBackend,
{
    let raw = raw.unwrap_or_default();
    let patient = patient_filter(&raw);

    debug!(patient = ?patient, "Processing audit trail request");

    let entries = state.storage().audit_trail(patient.as_deref()).await?;

    let mut self_link = format!("{}/AuditEvent", state.base_url());
    if !raw.is_empty() {
        self_link = format!("{}?{}", self_link, raw);
    }

    let bundle = entries.iter().fold(
        BundleBuilder::searchset().self_link(self_link),
        |bundle, entry| {
            bundle.add_entry(BundleEntry::search_result(
                audit_event_to_json(entry),
                format!("{}/AuditEvent/{}", state.base_url(), entry.id),
            ))
        },
    );

    Ok(fhir_json(bundle.build()))
}

fn patient_filter(raw: &str) -> Option<String> {
    url::form_urlencoded::parse(raw.as_bytes())
        .find(|(name, _)| name == "patient")
        .map(|(_, value)| {
            value
                .strip_prefix("Patient/")
                .unwrap_or(&value)
                .to_string()
        })
}

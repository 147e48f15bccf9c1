//! PIX query endpoint.
//!
//! Accepts an HL7v3 `PRPA_IN201309UV02` query in a SOAP 1.2 envelope and
//! answers with `PRPA_IN201310UV02`. Unlike the FHIR handlers this endpoint
//! never returns an OperationOutcome: unusable messages get a SOAP `Sender`
//! fault and every parsed query gets an acknowledgement.
//!
//! | Resolver outcome | Acknowledgement | Query response |
//! |------------------|-----------------|----------------|
//! | Ok | AA | OK |
//! | NotFound | AA | NF |
//! | Error | AE | AE |

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use patient_index_hl7v3::soap::{self, FaultCode, SOAP_CONTENT_TYPE};
use patient_index_hl7v3::{InstanceIdentifier, PixOutcome, PixQuery};
use patient_index_persistence::QueryOutcome;
use patient_index_persistence::core::AuditStorage;
use patient_index_persistence::types::{AuditEntry, AuditOperation};
use tracing::{debug, error, info, warn};

use crate::state::{AppState, PatientIndexBackend};

/// Handler for PIX queries.
///
/// # HTTP Request
///
/// `POST [pix_path]` with a SOAP 1.2 envelope body
///
/// # Response
///
/// - `200 OK` - `PRPA_IN201310UV02` acknowledgement
/// - `400 Bad Request` - SOAP `Sender` fault for an unusable message
/// - `500 Internal Server Error` - SOAP `Receiver` fault
pub async fn pix_query_handler<S>(State(state): State<AppState<S>>, body: String) -> Response
where
    S: PatientIndexBackend,
{
    let query = match PixQuery::from_soap(&body) {
        Ok(query) => query,
        Err(err) => {
            warn!(error = %err, "Rejecting PIX message");
            return fault_response(StatusCode::BAD_REQUEST, FaultCode::Sender, &err.to_string());
        }
    };

    debug!(
        domain = %query.query_domain(),
        value = %query.query_value(),
        data_sources = ?query.data_sources,
        "Processing PIX query"
    );

    let (outcome, patient_id) = state
        .resolver()
        .query_with_patient(query.query_domain(), query.query_value(), &query.data_sources)
        .await;

    match patient_id {
        Some(patient_id) => {
            let entry = AuditEntry::new(AuditOperation::PixQuery, patient_id)
                .with_query(audit_query_text(&query));
            if let Err(err) = state.storage().record_audit(entry).await {
                error!(error = %err, "Failed to audit PIX query");
                return fault_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    FaultCode::Receiver,
                    "Failed to record audit entry",
                );
            }
        }
        None => debug!("PIX query did not resolve to a patient; nothing to audit"),
    }

    let outcome = to_pix_outcome(outcome);
    info!(
        ack = outcome.ack_code(),
        response_code = outcome.query_response_code(),
        "PIX query answered"
    );

    match patient_index_hl7v3::render_response(&query, &outcome) {
        Ok(xml) => soap_response(StatusCode::OK, xml),
        Err(err) => {
            error!(error = %err, "Failed to render PIX response");
            fault_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                FaultCode::Receiver,
                "Failed to render response",
            )
        }
    }
}

/// Maps a resolver outcome onto the HL7v3 outcome, reporting each identifier
/// as `root` = domain and `extension` = value.
pub fn to_pix_outcome(outcome: QueryOutcome) -> PixOutcome {
    match outcome {
        QueryOutcome::Ok(identifiers) => PixOutcome::Ok(
            identifiers
                .into_iter()
                .map(|id| InstanceIdentifier::new(id.domain, id.value))
                .collect(),
        ),
        QueryOutcome::NotFound => PixOutcome::NotFound,
        QueryOutcome::Error => PixOutcome::Error,
    }
}

fn audit_query_text(query: &PixQuery) -> String {
    format!(
        "{}|{} -> [{}]",
        query.query_domain(),
        query.query_value(),
        query.data_sources.join(",")
    )
}

fn soap_response(status: StatusCode, xml: String) -> Response {
    (status, [(header::CONTENT_TYPE, SOAP_CONTENT_TYPE)], xml).into_response()
}

fn fault_response(status: StatusCode, code: FaultCode, reason: &str) -> Response {
    match soap::fault(code, reason).to_xml() {
        Ok(xml) => soap_response(status, xml),
        Err(err) => {
            error!(error = %err, "Failed to render SOAP fault");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

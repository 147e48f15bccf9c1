//! AuditEvent rendering of audit trail entries.

use patient_index_persistence::types::{AuditEntry, AuditOperation};
use serde_json::{Value, json};

const AUDIT_EVENT_TYPE: &str = "http://terminology.hl7.org/CodeSystem/audit-event-type";
const RESTFUL_INTERACTION: &str = "http://hl7.org/fhir/restful-interaction";
const IHE_EVENT_TYPE: &str = "urn:ihe:event-type-code";

/// Renders an audit entry as a FHIR AuditEvent.
pub fn audit_event_to_json(entry: &AuditEntry) -> Value {
    let (subtype_system, subtype_code) = subtype(entry.operation);

    let mut entity = json!({
        "what": { "reference": format!("Patient/{}", entry.patient_id) },
        "role": {
            "system": "http://terminology.hl7.org/CodeSystem/object-role",
            "code": "1",
            "display": "Patient"
        }
    });
    if let Some(query) = &entry.query {
        entity["description"] = json!(query);
    }

    json!({
        "resourceType": "AuditEvent",
        "id": entry.id,
        "type": { "system": AUDIT_EVENT_TYPE, "code": "rest", "display": "RESTful Operation" },
        "subtype": [{ "system": subtype_system, "code": subtype_code }],
        "action": entry.operation.action_code(),
        "recorded": entry.recorded_at.to_rfc3339(),
        "outcome": "0",
        "agent": [{ "who": { "display": crate::NAME }, "requestor": false }],
        "source": { "observer": { "display": crate::NAME } },
        "entity": [entity]
    })
}

fn subtype(operation: AuditOperation) -> (&'static str, &'static str) {
    match operation {
        AuditOperation::Create => (RESTFUL_INTERACTION, "create"),
        AuditOperation::Read => (RESTFUL_INTERACTION, "read"),
        AuditOperation::Update => (RESTFUL_INTERACTION, "update"),
        AuditOperation::Search => (RESTFUL_INTERACTION, "search-type"),
        AuditOperation::Merge => (RESTFUL_INTERACTION, "operation"),
        AuditOperation::PixQuery => (IHE_EVENT_TYPE, "ITI-45"),
    }
}

//! Patient resource mapping.
//!
//! Only identifiers are taken from request bodies. Activity, links and `meta`
//! are owned by the server and always come from the stored record.

use patient_index_persistence::{Identifier, PatientData, PatientRecord};
use serde_json::{Map, Value, json};

use crate::error::{RestError, RestResult};

/// Renders one version of a patient record as a FHIR Patient resource.
pub fn patient_to_json(record: &PatientRecord) -> Value {
    let mut resource = Map::new();
    resource.insert("resourceType".to_string(), json!("Patient"));
    resource.insert("id".to_string(), json!(record.id()));
    resource.insert(
        "meta".to_string(),
        json!({
            "versionId": record.version_id(),
            "lastUpdated": record.last_updated().to_rfc3339(),
        }),
    );
    resource.insert("active".to_string(), json!(record.is_active()));

    if !record.identifiers().is_empty() {
        let identifiers: Vec<Value> = record
            .identifiers()
            .iter()
            .map(|identifier| json!({ "system": identifier.system, "value": identifier.value }))
            .collect();
        resource.insert("identifier".to_string(), Value::Array(identifiers));
    }

    if !record.links().is_empty() {
        let links: Vec<Value> = record
            .links()
            .iter()
            .map(|link| {
                json!({
                    "other": { "reference": format!("Patient/{}", link.target) },
                    "type": link.link_type.as_str(),
                })
            })
            .collect();
        resource.insert("link".to_string(), Value::Array(links));
    }

    Value::Object(resource)
}

/// Reads the caller-controlled content of a Patient resource.
///
/// # Errors
///
/// * `RestError::BadRequest` - If the body is not a Patient, or an identifier
///   lacks a string `system` or `value`
pub fn patient_data_from_json(resource: &Value) -> RestResult<PatientData> {
    match resource.get("resourceType").and_then(Value::as_str) {
        Some("Patient") => {}
        Some(other) => {
            return Err(RestError::bad_request(format!(
                "Resource type in body ({}) does not match URL (Patient)",
                other
            )));
        }
        None => return Err(RestError::bad_request("Resource must contain resourceType")),
    }

    let identifiers = match resource.get("identifier") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| identifier_from_json(index, item))
            .collect::<RestResult<Vec<_>>>()?,
        Some(_) => return Err(RestError::bad_request("Patient.identifier must be an array")),
    };

    Ok(PatientData::new(identifiers))
}

/// Returns the `id` carried in a resource body, if any.
pub fn body_id(resource: &Value) -> Option<&str> {
    resource.get("id").and_then(Value::as_str)
}

fn identifier_from_json(index: usize, item: &Value) -> RestResult<Identifier> {
    let field = |name: &str| {
        item.get(name).and_then(Value::as_str).ok_or_else(|| {
            RestError::bad_request(format!(
                "Patient.identifier[{}] must have a string {}",
                index, name
            ))
        })
    };
    Ok(Identifier::new(field("system")?, field("value")?))
}

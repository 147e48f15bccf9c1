//! `Patient/$merge` request and response parameters.

use patient_index_persistence::core::MergeResult;
use serde_json::{Value, json};

use crate::error::{RestError, RestResult};
use crate::resources::patient::patient_to_json;
use crate::responses::operation_outcome::information_outcome;

/// Name of the parameter referencing the record to deactivate.
pub const SOURCE_PATIENT: &str = "source-patient";

/// Name of the parameter referencing the surviving record.
pub const TARGET_PATIENT: &str = "target-patient";

/// A parsed `$merge` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// Id of the record to deactivate.
    pub source_id: String,
    /// Id of the surviving record.
    pub target_id: String,
}

impl MergeRequest {
    /// Reads `source-patient` and `target-patient` from a Parameters resource.
    ///
    /// Both must be `valueReference`s of the form `Patient/{id}`.
    ///
    /// # Errors
    ///
    /// * `RestError::BadRequest` - If the body is not Parameters, a parameter
    ///   is missing, or a reference is absolute or names another type
    pub fn from_parameters(parameters: &Value) -> RestResult<Self> {
        if parameters.get("resourceType").and_then(Value::as_str) != Some("Parameters") {
            return Err(RestError::bad_request("$merge expects a Parameters resource"));
        }

        Ok(Self {
            source_id: patient_reference(parameters, SOURCE_PATIENT)?,
            target_id: patient_reference(parameters, TARGET_PATIENT)?,
        })
    }
}

fn patient_reference(parameters: &Value, name: &str) -> RestResult<String> {
    let reference = parameters
        .get("parameter")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|parameter| parameter.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|parameter| parameter.pointer("/valueReference/reference"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            RestError::bad_request(format!("Missing {} parameter with a valueReference", name))
        })?;

    if reference.contains("://") {
        return Err(RestError::bad_request(format!(
            "{} must be a relative reference, got '{}'",
            name, reference
        )));
    }

    match reference.split_once('/') {
        Some(("Patient", id)) if !id.is_empty() && !id.contains('/') => Ok(id.to_string()),
        _ => Err(RestError::bad_request(format!(
            "{} must reference a Patient, got '{}'",
            name, reference
        ))),
    }
}

/// Builds the `$merge` response: the input references, an informational
/// outcome, and the target record as `result`.
pub fn merge_response(result: &MergeResult) -> Value {
    let reference = |id: &str| json!({ "reference": format!("Patient/{}", id) });

    json!({
        "resourceType": "Parameters",
        "parameter": [
            { "name": SOURCE_PATIENT, "valueReference": reference(result.source.id()) },
            { "name": TARGET_PATIENT, "valueReference": reference(result.target.id()) },
            {
                "name": "outcome",
                "resource": information_outcome(&format!(
                    "Patient/{} merged into Patient/{}",
                    result.source.id(),
                    result.target.id()
                ))
            },
            { "name": "result", "resource": patient_to_json(&result.target) }
        ]
    })
}

//! FHIR JSON mappings for the resources this server exchanges.
//!
//! - [`patient`] - Patient records
//! - [`parameters`] - `$merge` Parameters
//! - [`audit_event`] - AuditEvent views of the audit trail

pub mod audit_event;
pub mod parameters;
pub mod patient;

pub use audit_event::audit_event_to_json;
pub use parameters::{MergeRequest, merge_response};
pub use patient::{body_id, patient_data_from_json, patient_to_json};

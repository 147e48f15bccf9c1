//! Axum extractors.
//!
//! - [`FhirResource`] - Extract a JSON FHIR resource body
//! - [`PatientSearchParams`] - Parse Patient search parameters

mod fhir_resource;
mod search_params;

pub use fhir_resource::FhirResource;
pub use search_params::PatientSearchParams;

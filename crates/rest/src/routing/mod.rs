//! Route configuration mapping HTTP paths to handlers.

pub mod fhir_routes;

pub use fhir_routes::create_routes;

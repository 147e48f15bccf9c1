//! Response formatting.
//!
//! - [`operation_outcome`] - OperationOutcome generation
//! - [`bundle`] - Bundle response building
//! - [`headers`] - Response header generation (ETag, Location, etc.)

pub mod bundle;
pub mod headers;
pub mod operation_outcome;

pub use bundle::{BundleBuilder, BundleEntry};
pub use headers::ResourceHeaders;
pub use operation_outcome::OperationOutcomeBuilder;

use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// Builds a JSON response with the given status and headers.
pub fn resource_response(status: StatusCode, headers: HeaderMap, body: Value) -> Response {
    // Json sets application/json; the explicit header map wins
    let mut response = Json(body).into_response();
    *response.status_mut() = status;
    response.headers_mut().extend(headers);
    response
}

/// Builds a `200 OK` FHIR JSON response without resource headers.
pub fn fhir_json(body: Value) -> Response {
    resource_response(StatusCode::OK, ResourceHeaders::new().to_header_map(), body)
}

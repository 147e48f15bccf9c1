//! FHIR resource extractor.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use serde_json::Value;

use crate::error::RestError;

/// Axum extractor for a JSON FHIR resource body.
///
/// Accepts `application/fhir+json`, `application/json`, or no content type.
/// The body must be a JSON object carrying a `resourceType`.
#[derive(Debug)]
pub struct FhirResource(pub Value);

impl FhirResource {
    /// Returns the resource type.
    pub fn resource_type(&self) -> Option<&str> {
        self.0.get("resourceType").and_then(Value::as_str)
    }

    /// Consumes the extractor and returns the inner Value.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl<S> FromRequest<S> for FhirResource
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();

        if !is_json(&content_type) {
            return Err(RestError::UnsupportedMediaType { content_type });
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| RestError::bad_request(e.body_text()))?;

        let value: Value = serde_json::from_slice(&bytes)?;
        if !value.is_object() {
            return Err(RestError::bad_request("Request body must be a JSON object"));
        }

        let resource = FhirResource(value);
        if resource.resource_type().is_none() {
            return Err(RestError::bad_request("Resource must contain resourceType"));
        }
        Ok(resource)
    }
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence == "application/fhir+json"
}

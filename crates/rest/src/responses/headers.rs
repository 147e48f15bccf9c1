//! Response header generation.

use axum::http::{HeaderMap, HeaderValue, header};
use patient_index_persistence::PatientRecord;

/// FHIR JSON media type.
pub const FHIR_JSON: &str = "application/fhir+json";

/// Builder for resource response headers: content type, `ETag`,
/// `Last-Modified` and, for creates, `Location`.
#[derive(Debug)]
pub struct ResourceHeaders {
    etag: Option<String>,
    last_modified: Option<String>,
    location: Option<String>,
    content_type: String,
}

impl Default for ResourceHeaders {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHeaders {
    /// Creates an empty builder with a FHIR JSON content type.
    pub fn new() -> Self {
        Self {
            etag: None,
            last_modified: None,
            location: None,
            content_type: FHIR_JSON.to_string(),
        }
    }

    /// Creates headers describing one version of a patient record.
    pub fn from_record(record: &PatientRecord) -> Self {
        Self::new()
            .with_version(&record.version_id())
            .with_last_modified(
                record
                    .last_updated()
                    .format("%a, %d %b %Y %H:%M:%S GMT")
                    .to_string(),
            )
    }

    /// Sets the ETag from a version id.
    pub fn with_version(mut self, version_id: &str) -> Self {
        self.etag = Some(format!("W/\"{}\"", version_id));
        self
    }

    /// Sets the Last-Modified value.
    pub fn with_last_modified(mut self, timestamp: impl Into<String>) -> Self {
        self.last_modified = Some(timestamp.into());
        self
    }

    /// Sets the Location URL.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Converts to an axum HeaderMap, skipping values that are not valid header text.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.content_type) {
            headers.insert(header::CONTENT_TYPE, value);
        }

        let optional = [
            (header::ETAG, &self.etag),
            (header::LAST_MODIFIED, &self.last_modified),
            (header::LOCATION, &self.location),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_deref().and_then(|v| HeaderValue::from_str(v).ok()) {
                headers.insert(name, value);
            }
        }

        headers
    }

    /// Returns the ETag value.
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Returns the Location value.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

//! Error types for the HTTP layer.
//!
//! Every error is returned to REST callers as a FHIR OperationOutcome with a
//! mapped status code. The PIX endpoint does not use these: it always answers
//! with an HL7v3 acknowledgement or a SOAP fault.
//!
//! # Error Mapping
//!
//! | Storage Error | HTTP Status | FHIR Issue Code |
//! |--------------|-------------|-----------------|
//! | NotFound / VersionNotFound | 404 | not-found |
//! | IdentifierNotFound | 404 | not-found |
//! | DuplicateId | 409 | duplicate |
//! | IdentifierConflict | 409 | conflict |
//! | UnknownReference | 422 | processing |
//! | InvalidMerge / InactiveRecord | 422 | processing |
//! | Validation | 400 | invalid |

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use patient_index_persistence::StorageError;
use tracing::{error, warn};

use crate::responses::operation_outcome::{IssueType, error_outcome};

/// The primary error type for HTTP operations.
#[derive(Debug)]
pub enum RestError {
    /// Record not found (HTTP 404).
    NotFound {
        /// The record id.
        id: String,
    },

    /// Version not found for vread (HTTP 404).
    VersionNotFound {
        /// The record id.
        id: String,
        /// The version id.
        version_id: String,
    },

    /// The requested id is already taken (HTTP 409).
    Duplicate {
        /// Message describing the duplicate.
        message: String,
    },

    /// The change conflicts with another record (HTTP 409).
    Conflict {
        /// Message describing the conflict.
        message: String,
    },

    /// Bad request - validation error (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Unsupported media type (HTTP 415).
    UnsupportedMediaType {
        /// The unsupported content type.
        content_type: String,
    },

    /// Well-formed request that cannot be applied (HTTP 422).
    UnprocessableEntity {
        /// Error message.
        message: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl RestError {
    /// Shorthand for [`RestError::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        RestError::BadRequest {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RestError::NotFound { .. } | RestError::VersionNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            RestError::Duplicate { .. } | RestError::Conflict { .. } => StatusCode::CONFLICT,
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RestError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn issue_type(&self) -> IssueType {
        match self {
            RestError::NotFound { .. } | RestError::VersionNotFound { .. } => IssueType::NotFound,
            RestError::Duplicate { .. } => IssueType::Duplicate,
            RestError::Conflict { .. } => IssueType::Conflict,
            RestError::BadRequest { .. } => IssueType::Invalid,
            RestError::UnsupportedMediaType { .. } => IssueType::NotSupported,
            RestError::UnprocessableEntity { .. } => IssueType::Processing,
            RestError::InternalError { .. } => IssueType::Exception,
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::NotFound { id } => write!(f, "Resource not found: Patient/{}", id),
            RestError::VersionNotFound { id, version_id } => {
                write!(f, "Version not found: Patient/{}/_history/{}", id, version_id)
            }
            RestError::Duplicate { message } => write!(f, "Duplicate: {}", message),
            RestError::Conflict { message } => write!(f, "Conflict: {}", message),
            RestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RestError::UnsupportedMediaType { content_type } => {
                write!(f, "Unsupported media type: {}", content_type)
            }
            RestError::UnprocessableEntity { message } => {
                write!(f, "Unprocessable entity: {}", message)
            }
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let outcome = error_outcome(self.issue_type(), &self.to_string());
        (status, Json(outcome)).into_response()
    }
}

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id } => RestError::NotFound { id },
            StorageError::VersionNotFound { id, version } => RestError::VersionNotFound {
                id,
                version_id: version,
            },
            StorageError::IdentifierNotFound { system, value } => RestError::NotFound {
                id: format!("?identifier={}|{}", system, value),
            },
            StorageError::DuplicateId { .. } => RestError::Duplicate {
                message: err.to_string(),
            },
            StorageError::IdentifierConflict { .. } => RestError::Conflict {
                message: err.to_string(),
            },
            StorageError::UnknownReference { .. }
            | StorageError::InvalidMerge { .. }
            | StorageError::InactiveRecord { .. } => RestError::UnprocessableEntity {
                message: err.to_string(),
            },
            StorageError::Validation { message } => RestError::BadRequest { message },
        }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::bad_request(format!("Invalid JSON: {}", err))
    }
}

/// Result type alias for HTTP operations.
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = RestError::NotFound {
            id: "123".to_string(),
        };
        assert_eq!(err.to_string(), "Resource not found: Patient/123");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_error_mapping() {
        let cases = [
            (StorageError::not_found("1"), StatusCode::NOT_FOUND),
            (
                StorageError::VersionNotFound {
                    id: "1".to_string(),
                    version: "9".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                StorageError::DuplicateId {
                    id: "1".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (
                StorageError::IdentifierConflict {
                    system: "s".to_string(),
                    value: "v".to_string(),
                    owner: "2".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (
                StorageError::UnknownReference {
                    reference: "x".to_string(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                StorageError::InvalidMerge {
                    message: "same record".to_string(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                StorageError::InactiveRecord {
                    id: "1".to_string(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (StorageError::validation("bad id"), StatusCode::BAD_REQUEST),
        ];

        for (storage_error, status) in cases {
            assert_eq!(RestError::from(storage_error).status(), status);
        }
    }

    #[test]
    fn test_issue_codes() {
        let duplicate = RestError::from(StorageError::DuplicateId {
            id: "1".to_string(),
        });
        assert_eq!(duplicate.issue_type(), IssueType::Duplicate);

        let conflict = RestError::Conflict {
            message: "taken".to_string(),
        };
        assert_eq!(conflict.issue_type(), IssueType::Conflict);
    }

    #[test]
    fn test_json_error_is_bad_request() {
        let err: RestError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("Invalid JSON"));
    }
}

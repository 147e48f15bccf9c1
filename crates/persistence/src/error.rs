//! Error types for the identity core.
//!
//! Storage operations fail with [`StorageError`]; cross-reference queries fail
//! with [`ResolveError`]. Neither type carries protocol vocabulary: adapters map
//! them onto HTTP status codes or HL7v3 acknowledgement codes.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all storage operations.
///
/// Every mutating operation either commits completely or fails with one of these
/// variants without leaving a trace in the store or the identifier index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No record with the given id exists.
    #[error("patient not found: {id}")]
    NotFound { id: String },

    /// The record exists but the requested version does not.
    #[error("version not found: {id}/_history/{version}")]
    VersionNotFound { id: String, version: String },

    /// A create asked for an id that is already assigned.
    #[error("patient already exists: {id}")]
    DuplicateId { id: String },

    /// The identifier is already held by another active record.
    #[error("identifier {system}|{value} is already assigned to patient {owner}")]
    IdentifierConflict {
        system: String,
        value: String,
        owner: String,
    },

    /// No active record owns the identifier.
    #[error("no patient holds identifier {system}|{value}")]
    IdentifierNotFound { system: String, value: String },

    /// A merge reference does not resolve to an existing record.
    #[error("unknown reference: Patient/{reference}")]
    UnknownReference { reference: String },

    /// The merge request is well-formed but cannot be applied.
    #[error("invalid merge: {message}")]
    InvalidMerge { message: String },

    /// The record was merged away and no longer accepts updates.
    #[error("patient {id} is inactive and cannot be modified")]
    InactiveRecord { id: String },

    /// The input failed validation.
    #[error("validation failed: {message}")]
    Validation { message: String },
}

impl StorageError {
    /// Shorthand for [`StorageError::NotFound`].
    pub fn not_found(id: impl Into<String>) -> Self {
        StorageError::NotFound { id: id.into() }
    }

    /// Shorthand for [`StorageError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        StorageError::Validation {
            message: message.into(),
        }
    }

    /// Returns true if the error reports a missing record or version.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::NotFound { .. }
                | StorageError::VersionNotFound { .. }
                | StorageError::IdentifierNotFound { .. }
        )
    }
}

/// Errors produced by a cross-reference query.
///
/// The two query-level variants must stay distinct: failing to resolve the
/// queried identifier is an error, while a resolved identity that holds nothing
/// in the requested domains is merely "not found".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The queried identifier does not resolve to an active patient.
    #[error("unknown identity: {domain}|{value}")]
    UnknownIdentity { domain: String, value: String },

    /// The patient was resolved but holds no identifier in any requested domain.
    #[error("patient {patient_id} holds no identifier in the requested domains")]
    NoMatchingDomain { patient_id: String },

    /// The underlying store failed while answering the query.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for cross-reference queries.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StorageError::not_found("123");
        assert_eq!(err.to_string(), "patient not found: 123");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_identifier_conflict_display() {
        let err = StorageError::IdentifierConflict {
            system: "urn:oid:1.1".to_string(),
            value: "A".to_string(),
            owner: "p-1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "identifier urn:oid:1.1|A is already assigned to patient p-1"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_version_not_found_display() {
        let err = StorageError::VersionNotFound {
            id: "p-1".to_string(),
            version: "7".to_string(),
        };
        assert_eq!(err.to_string(), "version not found: p-1/_history/7");
    }

    #[test]
    fn test_resolve_error_from_storage() {
        let err: ResolveError = StorageError::validation("bad").into();
        assert!(matches!(err, ResolveError::Storage(_)));
        assert_eq!(err.to_string(), "validation failed: bad");
    }
}

//! Identifier lookup and patient search traits.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{Identifier, PatientQuery, PatientRecord};

use super::storage::PatientStorage;

/// Exact-match access to the identifier index.
///
/// Only active records are visible through this trait. A merged-away record
/// keeps its identifiers, but no lookup resolves to it.
#[async_trait]
pub trait IdentifierLookup: PatientStorage {
    /// Returns the id of the active record holding `system|value`.
    ///
    /// No normalization is applied to either string.
    ///
    /// # Errors
    ///
    /// * `StorageError::IdentifierNotFound` - If no active record holds the identifier
    async fn lookup_by_identifier(&self, system: &str, value: &str) -> StorageResult<String>;

    /// Returns the identifiers indexed for a record, in stored order.
    ///
    /// # Errors
    ///
    /// * `StorageError::NotFound` - If the record does not exist
    async fn identifiers_of(&self, id: &str) -> StorageResult<Vec<Identifier>>;

    /// Resolves `system|value` and returns the holder's id together with its
    /// identifiers, both read from one snapshot of the index.
    ///
    /// # Errors
    ///
    /// * `StorageError::IdentifierNotFound` - If no active record holds the identifier
    async fn holder_of(&self, system: &str, value: &str) -> StorageResult<(String, Vec<Identifier>)>;

    /// Returns the identifiers of an active record, in stored order.
    ///
    /// # Errors
    ///
    /// * `StorageError::NotFound` - If the record does not exist or has been merged away
    async fn active_identifiers(&self, id: &str) -> StorageResult<Vec<Identifier>>;
}

/// Patient search.
#[async_trait]
pub trait PatientSearch: PatientStorage {
    /// Returns the latest versions of all records matching `query`.
    ///
    /// An identifier criterion matches active records only. Results are ordered
    /// by `query.sort`, or by id when no sort is requested.
    async fn search(&self, query: &PatientQuery) -> StorageResult<Vec<PatientRecord>>;
}

//! Versioned storage trait.
//!
//! Every committed version of a record is retained. This module exposes them
//! through version reads and instance history.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::PatientRecord;

use super::storage::PatientStorage;

/// Storage trait with access to prior versions.
#[async_trait]
pub trait VersionedStorage: PatientStorage {
    /// Reads a specific version of a record.
    ///
    /// This corresponds to `GET [base]/Patient/[id]/_history/[vid]`.
    ///
    /// # Errors
    ///
    /// * `StorageError::NotFound` - If the record does not exist
    /// * `StorageError::VersionNotFound` - If the record exists but the version does not
    async fn vread(&self, id: &str, version: u64) -> StorageResult<PatientRecord>;

    /// Returns every version of a record, newest first.
    ///
    /// # Errors
    ///
    /// * `StorageError::NotFound` - If the record does not exist
    async fn history(&self, id: &str) -> StorageResult<Vec<PatientRecord>>;
}

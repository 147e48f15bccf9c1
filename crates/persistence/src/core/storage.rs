//! Core patient storage trait.
//!
//! This module defines [`PatientStorage`], the versioned record store. It is the
//! only writer of patient records: every create and update passes through it,
//! and the identifier index is updated in the same atomic step.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{PatientData, PatientRecord};

/// Versioned store of patient records.
///
/// # Versioning
///
/// A new record starts at version 1. Each successful update produces exactly
/// one new version, and updates to the same id are linearizable: concurrent
/// writers serialize and no update is lost.
///
/// # Identifier uniqueness
///
/// Within the set of active records, an identifier `(system, value)` belongs to
/// at most one record. Create and update fail with
/// `StorageError::IdentifierConflict` rather than break this invariant.
///
/// # Example
///
/// ```
/// use patient_index_persistence::backends::memory::InMemoryBackend;
/// use patient_index_persistence::core::PatientStorage;
/// use patient_index_persistence::types::PatientData;
///
/// # tokio_test::block_on(async {
/// let store = InMemoryBackend::new();
///
/// let data = PatientData::default().with_identifier("urn:oid:1.1", "A");
/// let created = store.create(data, None).await.unwrap();
/// assert_eq!(created.version(), 1);
///
/// let updated = store
///     .update(created.id(), PatientData::default().with_identifier("urn:oid:1.1", "B"))
///     .await
///     .unwrap();
/// assert_eq!(updated.version(), 2);
/// # });
/// ```
#[async_trait]
pub trait PatientStorage: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Creates a new record.
    ///
    /// # Arguments
    ///
    /// * `data` - The caller-controlled content
    /// * `requested_id` - An id chosen by the caller; generated when `None`
    ///
    /// # Returns
    ///
    /// Version 1 of the new, active record.
    ///
    /// # Errors
    ///
    /// * `StorageError::DuplicateId` - If `requested_id` is already assigned
    /// * `StorageError::IdentifierConflict` - If an identifier is held by another active record
    /// * `StorageError::Validation` - If an id or identifier is malformed
    async fn create(
        &self,
        data: PatientData,
        requested_id: Option<&str>,
    ) -> StorageResult<PatientRecord>;

    /// Creates a record with a specific id, or updates it if it exists (PUT semantics).
    ///
    /// # Returns
    ///
    /// A tuple of (record, created) where `created` is true if a new record was created.
    async fn create_or_update(
        &self,
        id: &str,
        data: PatientData,
    ) -> StorageResult<(PatientRecord, bool)>;

    /// Reads the latest version of a record.
    ///
    /// Inactive records are returned too; callers decide whether activity matters.
    ///
    /// # Errors
    ///
    /// * `StorageError::NotFound` - If no record with this id was ever created
    async fn read(&self, id: &str) -> StorageResult<PatientRecord>;

    /// Replaces the identifier set of an existing record.
    ///
    /// # Errors
    ///
    /// * `StorageError::NotFound` - If the record does not exist
    /// * `StorageError::InactiveRecord` - If the record was merged away
    /// * `StorageError::IdentifierConflict` - If an identifier is held by another active record
    async fn update(&self, id: &str, data: PatientData) -> StorageResult<PatientRecord>;

    /// Returns the number of records, active or not.
    async fn count(&self) -> StorageResult<u64>;
}

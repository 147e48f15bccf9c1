//! Merge/link manager.
//!
//! A merge consolidates two records that describe the same person. The source
//! record is deactivated and gains a `replaced-by` link to the target; the
//! target is left untouched. Identifiers are not transferred.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::PatientRecord;

use super::storage::PatientStorage;

/// The records involved in a successful merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// The new, inactive version of the source record.
    pub source: PatientRecord,
    /// The target record as it stands after the merge.
    pub target: PatientRecord,
}

/// Storage trait for merging records.
#[async_trait]
pub trait MergeStorage: PatientStorage {
    /// Merges `source_id` into `target_id`.
    ///
    /// The merge is all-or-nothing: on any error neither record changes.
    ///
    /// # Errors
    ///
    /// * `StorageError::UnknownReference` - If either id does not resolve to a record
    /// * `StorageError::InvalidMerge` - If the ids are equal or either record is inactive
    async fn merge(&self, source_id: &str, target_id: &str) -> StorageResult<MergeResult>;
}

//! Audit trail trait.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::AuditEntry;

/// Append-only audit log of record access.
///
/// Backends may bound the log; the oldest entries are dropped first.
#[async_trait]
pub trait AuditStorage: Send + Sync {
    /// Appends an entry.
    async fn record_audit(&self, entry: AuditEntry) -> StorageResult<()>;

    /// Returns retained entries in recording order, optionally restricted to one
    /// patient id.
    async fn audit_trail(&self, patient_id: Option<&str>) -> StorageResult<Vec<AuditEntry>>;
}

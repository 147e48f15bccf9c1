//! Change events.
//!
//! Backends publish a [`PatientChange`] for every committed create, update and
//! merge. Consumers subscribe through [`ChangeFeed`] and receive events in
//! commit order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::PatientRecord;

/// What kind of change was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChangeKind {
    /// A record was created.
    Created,
    /// A record's identifiers were replaced.
    Updated,
    /// A record was merged into `target`.
    Merged {
        /// Id of the surviving record.
        target: String,
    },
}

/// A committed change to one patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientChange {
    /// The kind of change.
    #[serde(flatten)]
    pub kind: ChangeKind,
    /// Id of the changed record.
    pub id: String,
    /// Version produced by the change.
    pub version: u64,
    /// Commit time of that version.
    pub occurred_at: DateTime<Utc>,
}

impl PatientChange {
    /// Describes `record` as the result of `kind`.
    pub fn new(kind: ChangeKind, record: &PatientRecord) -> Self {
        Self {
            kind,
            id: record.id().to_string(),
            version: record.version(),
            occurred_at: record.last_updated(),
        }
    }
}

/// Source of change events.
pub trait ChangeFeed {
    /// Returns a receiver for changes committed after this call.
    ///
    /// Slow receivers lag and lose the oldest events rather than block writers.
    fn subscribe(&self) -> broadcast::Receiver<PatientChange>;
}

//! In-memory backend.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::core::{ChangeKind, IdentifierIndex, PatientChange};
use crate::error::{StorageError, StorageResult};
use crate::types::{AuditEntry, Identifier, PatientRecord};

/// Configuration for the in-memory backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryBackendConfig {
    /// Maximum number of audit entries retained; the oldest are dropped first.
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,

    /// Number of change events buffered per subscriber before it lags.
    #[serde(default = "default_change_buffer")]
    pub change_buffer: usize,
}

fn default_audit_capacity() -> usize {
    10_000
}

fn default_change_buffer() -> usize {
    1024
}

impl Default for InMemoryBackendConfig {
    fn default() -> Self {
        Self {
            audit_capacity: default_audit_capacity(),
            change_buffer: default_change_buffer(),
        }
    }
}

/// Records and index, guarded together.
#[derive(Debug, Default)]
pub(super) struct StoreState {
    /// Every version of every record, oldest first.
    pub(super) versions: HashMap<String, Vec<PatientRecord>>,
    pub(super) index: IdentifierIndex,
}

impl StoreState {
    pub(super) fn latest(&self, id: &str) -> StorageResult<&PatientRecord> {
        self.versions
            .get(id)
            .and_then(|versions| versions.last())
            .ok_or_else(|| StorageError::not_found(id))
    }

    /// Appends a version and mirrors its identifiers and activity into the index.
    pub(super) fn commit(&mut self, record: PatientRecord) {
        let id = record.id().to_string();
        if self.versions.contains_key(&id) {
            self.index.replace(&id, record.identifiers());
        } else {
            self.index.insert(&id, record.identifiers());
        }
        if !record.is_active() {
            self.index.deactivate(&id);
        }
        self.versions.entry(id).or_default().push(record);
    }
}

/// Process-local patient store.
pub struct InMemoryBackend {
    pub(super) state: RwLock<StoreState>,
    pub(super) audit: Mutex<VecDeque<AuditEntry>>,
    pub(super) changes: broadcast::Sender<PatientChange>,
    pub(super) config: InMemoryBackendConfig,
}

impl Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("config", &self.config)
            .field("records", &self.state.read().versions.len())
            .field("audit_entries", &self.audit.lock().len())
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Creates an empty backend with default configuration.
    pub fn new() -> Self {
        Self::with_config(InMemoryBackendConfig::default())
    }

    /// Creates an empty backend with custom configuration.
    pub fn with_config(config: InMemoryBackendConfig) -> Self {
        let (changes, _) = broadcast::channel(config.change_buffer.max(1));
        Self {
            state: RwLock::new(StoreState::default()),
            audit: Mutex::new(VecDeque::new()),
            changes,
            config,
        }
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &InMemoryBackendConfig {
        &self.config
    }

    /// Publishes a change. Called with the state write lock held so that
    /// events leave in commit order.
    pub(super) fn publish(&self, kind: ChangeKind, record: &PatientRecord) {
        // No receivers is not an error.
        let _ = self.changes.send(PatientChange::new(kind, record));
    }

    pub(super) fn push_audit(&self, entry: AuditEntry) {
        let mut audit = self.audit.lock();
        if self.config.audit_capacity == 0 {
            return;
        }
        while audit.len() >= self.config.audit_capacity {
            audit.pop_front();
        }
        audit.push_back(entry);
    }
}

/// Checks a caller-supplied record id: 1-64 characters of `[A-Za-z0-9.-]`.
pub(super) fn validate_id(id: &str) -> StorageResult<()> {
    let valid = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(StorageError::validation(format!("invalid patient id '{}'", id)))
    }
}

/// Checks that every identifier has a system and a value.
pub(super) fn validate_identifiers(identifiers: &[Identifier]) -> StorageResult<()> {
    match identifiers
        .iter()
        .find(|id| id.system.is_empty() || id.value.is_empty())
    {
        Some(bad) => Err(StorageError::validation(format!(
            "identifier '{}' must have both a system and a value",
            bad
        ))),
        None => Ok(()),
    }
}

//! Storage trait implementations for the in-memory backend.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::{
    AuditStorage, ChangeFeed, ChangeKind, IdentifierLookup, MergeResult, MergeStorage,
    PatientChange, PatientSearch, PatientStorage, VersionedStorage,
};
use crate::error::{StorageError, StorageResult};
use crate::types::{
    AuditEntry, AuditOperation, Identifier, PatientData, PatientQuery, PatientRecord,
};

use super::backend::{InMemoryBackend, StoreState, validate_id, validate_identifiers};

impl InMemoryBackend {
    /// Creates a record under the write lock. `state` must not contain `id`.
    fn create_locked(
        &self,
        state: &mut StoreState,
        id: String,
        data: PatientData,
    ) -> StorageResult<PatientRecord> {
        state.index.ensure_available(&data.identifiers, None)?;

        let record = PatientRecord::new(id, data);
        state.commit(record.clone());
        self.publish(ChangeKind::Created, &record);
        self.push_audit(AuditEntry::new(AuditOperation::Create, record.id()));

        info!(id = %record.id(), identifiers = record.identifiers().len(), "Created patient");
        Ok(record)
    }

    /// Appends a new version of an existing record under the write lock.
    fn update_locked(
        &self,
        state: &mut StoreState,
        id: &str,
        data: PatientData,
    ) -> StorageResult<PatientRecord> {
        let current = state.latest(id)?;
        if !current.is_active() {
            warn!(id = %id, "Rejected update of inactive patient");
            return Err(StorageError::InactiveRecord { id: id.to_string() });
        }
        state.index.ensure_available(&data.identifiers, Some(id))?;

        let record = current.next_with(data);
        state.commit(record.clone());
        self.publish(ChangeKind::Updated, &record);
        self.push_audit(AuditEntry::new(AuditOperation::Update, id));

        info!(id = %id, version = record.version(), "Updated patient");
        Ok(record)
    }
}

#[async_trait]
impl PatientStorage for InMemoryBackend {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        data: PatientData,
        requested_id: Option<&str>,
    ) -> StorageResult<PatientRecord> {
        validate_identifiers(&data.identifiers)?;
        if let Some(id) = requested_id {
            validate_id(id)?;
        }

        let mut state = self.state.write();
        let id = match requested_id {
            Some(id) if state.versions.contains_key(id) => {
                return Err(StorageError::DuplicateId { id: id.to_string() });
            }
            Some(id) => id.to_string(),
            None => loop {
                let candidate = Uuid::new_v4().to_string();
                if !state.versions.contains_key(&candidate) {
                    break candidate;
                }
            },
        };

        self.create_locked(&mut state, id, data)
    }

    async fn create_or_update(
        &self,
        id: &str,
        data: PatientData,
    ) -> StorageResult<(PatientRecord, bool)> {
        validate_id(id)?;
        validate_identifiers(&data.identifiers)?;

        let mut state = self.state.write();
        if state.versions.contains_key(id) {
            let record = self.update_locked(&mut state, id, data)?;
            Ok((record, false))
        } else {
            let record = self.create_locked(&mut state, id.to_string(), data)?;
            Ok((record, true))
        }
    }

    async fn read(&self, id: &str) -> StorageResult<PatientRecord> {
        let state = self.state.read();
        state.latest(id).cloned()
    }

    async fn update(&self, id: &str, data: PatientData) -> StorageResult<PatientRecord> {
        validate_identifiers(&data.identifiers)?;

        let mut state = self.state.write();
        self.update_locked(&mut state, id, data)
    }

    async fn count(&self) -> StorageResult<u64> {
        Ok(self.state.read().versions.len() as u64)
    }
}

#[async_trait]
impl VersionedStorage for InMemoryBackend {
    async fn vread(&self, id: &str, version: u64) -> StorageResult<PatientRecord> {
        let state = self.state.read();
        let versions = state
            .versions
            .get(id)
            .ok_or_else(|| StorageError::not_found(id))?;

        versions
            .iter()
            .find(|record| record.version() == version)
            .cloned()
            .ok_or_else(|| StorageError::VersionNotFound {
                id: id.to_string(),
                version: version.to_string(),
            })
    }

    async fn history(&self, id: &str) -> StorageResult<Vec<PatientRecord>> {
        let state = self.state.read();
        let versions = state
            .versions
            .get(id)
            .ok_or_else(|| StorageError::not_found(id))?;
        Ok(versions.iter().rev().cloned().collect())
    }
}

#[async_trait]
impl IdentifierLookup for InMemoryBackend {
    async fn lookup_by_identifier(&self, system: &str, value: &str) -> StorageResult<String> {
        let state = self.state.read();
        state
            .index
            .active_owner(system, value)
            .map(str::to_string)
            .ok_or_else(|| StorageError::IdentifierNotFound {
                system: system.to_string(),
                value: value.to_string(),
            })
    }

    async fn identifiers_of(&self, id: &str) -> StorageResult<Vec<Identifier>> {
        let state = self.state.read();
        state
            .index
            .identifiers_of(id)
            .map(<[Identifier]>::to_vec)
            .ok_or_else(|| StorageError::not_found(id))
    }

    async fn holder_of(&self, system: &str, value: &str) -> StorageResult<(String, Vec<Identifier>)> {
        let state = self.state.read();
        let owner = state.index.active_owner(system, value).ok_or_else(|| {
            StorageError::IdentifierNotFound {
                system: system.to_string(),
                value: value.to_string(),
            }
        })?;
        let identifiers = state
            .index
            .identifiers_of(owner)
            .map(<[Identifier]>::to_vec)
            .unwrap_or_default();
        Ok((owner.to_string(), identifiers))
    }

    async fn active_identifiers(&self, id: &str) -> StorageResult<Vec<Identifier>> {
        let state = self.state.read();
        if !state.index.is_active(id) {
            return Err(StorageError::not_found(id));
        }
        Ok(state
            .index
            .identifiers_of(id)
            .map(<[Identifier]>::to_vec)
            .unwrap_or_default())
    }
}

#[async_trait]
impl PatientSearch for InMemoryBackend {
    async fn search(&self, query: &PatientQuery) -> StorageResult<Vec<PatientRecord>> {
        let state = self.state.read();

        let mut results: Vec<PatientRecord> = match &query.identifier {
            // Narrow through the index before applying the remaining criteria.
            Some(identifier) => state
                .index
                .active_owner(&identifier.system, &identifier.value)
                .and_then(|id| state.latest(id).ok())
                .filter(|record| query.matches(record))
                .cloned()
                .into_iter()
                .collect(),
            None => state
                .versions
                .values()
                .filter_map(|versions| versions.last())
                .filter(|record| query.matches(record))
                .cloned()
                .collect(),
        };
        drop(state);

        query.sort(&mut results);
        debug!(matches = results.len(), "Patient search complete");
        Ok(results)
    }
}

#[async_trait]
impl MergeStorage for InMemoryBackend {
    async fn merge(&self, source_id: &str, target_id: &str) -> StorageResult<MergeResult> {
        let mut state = self.state.write();

        let unknown = |reference: &str| StorageError::UnknownReference {
            reference: reference.to_string(),
        };
        let source = state.latest(source_id).map_err(|_| unknown(source_id))?;
        let target = state.latest(target_id).map_err(|_| unknown(target_id))?;

        if source_id == target_id {
            return Err(StorageError::InvalidMerge {
                message: "source and target are the same patient".to_string(),
            });
        }
        if !source.is_active() {
            return Err(StorageError::InvalidMerge {
                message: format!("source patient {} is already inactive", source_id),
            });
        }
        if !target.is_active() {
            return Err(StorageError::InvalidMerge {
                message: format!("target patient {} is inactive", target_id),
            });
        }

        let target = target.clone();
        let merged = source.next_replaced_by(target_id);
        state.commit(merged.clone());

        self.publish(
            ChangeKind::Merged {
                target: target_id.to_string(),
            },
            &merged,
        );
        self.push_audit(
            AuditEntry::new(AuditOperation::Merge, source_id)
                .with_query(format!("target=Patient/{}", target_id)),
        );
        self.push_audit(
            AuditEntry::new(AuditOperation::Merge, target_id)
                .with_query(format!("source=Patient/{}", source_id)),
        );

        info!(source = %source_id, target = %target_id, "Merged patient");
        Ok(MergeResult {
            source: merged,
            target,
        })
    }
}

#[async_trait]
impl AuditStorage for InMemoryBackend {
    async fn record_audit(&self, entry: AuditEntry) -> StorageResult<()> {
        debug!(
            target: "audit",
            operation = entry.operation.as_str(),
            patient = %entry.patient_id,
            "Audit entry"
        );
        self.push_audit(entry);
        Ok(())
    }

    async fn audit_trail(&self, patient_id: Option<&str>) -> StorageResult<Vec<AuditEntry>> {
        let audit = self.audit.lock();
        Ok(audit
            .iter()
            .filter(|entry| patient_id.is_none_or(|id| entry.patient_id == id))
            .cloned()
            .collect())
    }
}

impl ChangeFeed for InMemoryBackend {
    fn subscribe(&self) -> broadcast::Receiver<PatientChange> {
        self.changes.subscribe()
    }
}

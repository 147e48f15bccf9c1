//! Identifier index.
//!
//! [`IdentifierIndex`] maps `(system, value)` pairs to the records that carry
//! them. It is a derived structure: backends update it inside the same critical
//! section as the record mutation it mirrors, so readers never observe the two
//! out of step.
//!
//! Inactive (merged-away) records keep their entries, but they are skipped by
//! [`IdentifierIndex::active_owner`] and do not block other records from
//! claiming the same identifier.

use std::collections::{BTreeSet, HashMap};

use crate::error::{StorageError, StorageResult};
use crate::types::Identifier;

#[derive(Debug, Default)]
struct IndexedRecord {
    identifiers: Vec<Identifier>,
    active: bool,
}

/// Secondary index over patient identifiers.
#[derive(Debug, Default)]
pub struct IdentifierIndex {
    owners: HashMap<Identifier, BTreeSet<String>>,
    records: HashMap<String, IndexedRecord>,
}

impl IdentifierIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of the active record holding `system|value`, if any.
    pub fn active_owner(&self, system: &str, value: &str) -> Option<&str> {
        let key = Identifier::new(system, value);
        self.owners.get(&key)?.iter().find_map(|id| {
            self.records
                .get(id)
                .filter(|record| record.active)
                .map(|_| id.as_str())
        })
    }

    /// Returns every record, active or not, that has ever been indexed under
    /// `system|value`.
    #[cfg(test)]
    fn all_owners(&self, system: &str, value: &str) -> Vec<&str> {
        self.owners
            .get(&Identifier::new(system, value))
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the identifiers indexed for `id`, in stored order.
    pub fn identifiers_of(&self, id: &str) -> Option<&[Identifier]> {
        self.records.get(id).map(|r| r.identifiers.as_slice())
    }

    /// Returns whether `id` is indexed and active.
    pub fn is_active(&self, id: &str) -> bool {
        self.records.get(id).is_some_and(|r| r.active)
    }

    /// Checks that none of `identifiers` is held by an active record other than
    /// `claimant`.
    ///
    /// # Errors
    ///
    /// * `StorageError::IdentifierConflict` - naming the first colliding pair
    pub fn ensure_available(
        &self,
        identifiers: &[Identifier],
        claimant: Option<&str>,
    ) -> StorageResult<()> {
        for identifier in identifiers {
            if let Some(owner) = self.active_owner(&identifier.system, &identifier.value) {
                if Some(owner) != claimant {
                    return Err(StorageError::IdentifierConflict {
                        system: identifier.system.clone(),
                        value: identifier.value.clone(),
                        owner: owner.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Indexes a newly created, active record.
    pub fn insert(&mut self, id: &str, identifiers: &[Identifier]) {
        for identifier in identifiers {
            self.owners
                .entry(identifier.clone())
                .or_default()
                .insert(id.to_string());
        }
        self.records.insert(
            id.to_string(),
            IndexedRecord {
                identifiers: identifiers.to_vec(),
                active: true,
            },
        );
    }

    /// Replaces the identifiers indexed for `id`.
    pub fn replace(&mut self, id: &str, identifiers: &[Identifier]) {
        let active = self.records.get(id).is_none_or(|r| r.active);
        self.remove_entries(id);
        self.insert(id, identifiers);
        if let Some(record) = self.records.get_mut(id) {
            record.active = active;
        }
    }

    /// Marks `id` inactive, keeping its entries.
    pub fn deactivate(&mut self, id: &str) {
        if let Some(record) = self.records.get_mut(id) {
            record.active = false;
        }
    }

    /// Returns the number of indexed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn remove_entries(&mut self, id: &str) {
        let Some(previous) = self.records.remove(id) else {
            return;
        };
        for identifier in previous.identifiers {
            if let Some(ids) = self.owners.get_mut(&identifier) {
                ids.remove(id);
                if ids.is_empty() {
                    self.owners.remove(&identifier);
                }
            }
        }
    }
}

//! Patient record types.
//!
//! [`PatientRecord`] is one committed version of a patient. [`PatientData`]
//! carries the caller-controlled fields for create and update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifier::Identifier;

/// The kind of link between two patient records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkType {
    /// The record was merged into the link target, which supersedes it.
    ReplacedBy,
}

impl LinkType {
    /// Returns the FHIR code for this link type.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::ReplacedBy => "replaced-by",
        }
    }
}

/// A link from one patient record to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientLink {
    /// The link type.
    pub link_type: LinkType,
    /// Id of the linked record.
    pub target: String,
}

impl PatientLink {
    /// Creates a `replaced-by` link pointing at `target`.
    pub fn replaced_by(target: impl Into<String>) -> Self {
        Self {
            link_type: LinkType::ReplacedBy,
            target: target.into(),
        }
    }
}

/// Caller-supplied content of a patient record.
///
/// Only the identifier list is under caller control. Activity and links are
/// owned by the merge manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientData {
    /// Identifiers in caller order.
    pub identifiers: Vec<Identifier>,
}

impl PatientData {
    /// Creates patient data with the given identifiers.
    pub fn new(identifiers: Vec<Identifier>) -> Self {
        Self { identifiers }
    }

    /// Appends an identifier.
    pub fn with_identifier(mut self, system: impl Into<String>, value: impl Into<String>) -> Self {
        self.identifiers.push(Identifier::new(system, value));
        self
    }
}

/// One committed version of a patient record.
///
/// # Examples
///
/// ```
/// use patient_index_persistence::types::{Identifier, PatientData, PatientRecord};
///
/// let data = PatientData::default().with_identifier("urn:oid:1.1", "A");
/// let record = PatientRecord::new("p-1", data);
///
/// assert_eq!(record.id(), "p-1");
/// assert_eq!(record.version(), 1);
/// assert!(record.is_active());
/// assert_eq!(record.identifiers(), &[Identifier::new("urn:oid:1.1", "A")]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    id: String,
    version: u64,
    active: bool,
    identifiers: Vec<Identifier>,
    links: Vec<PatientLink>,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl PatientRecord {
    /// Creates version 1 of a new, active record.
    pub fn new(id: impl Into<String>, data: PatientData) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            version: 1,
            active: true,
            identifiers: data.identifiers,
            links: Vec::new(),
            created_at: now,
            last_updated: now,
        }
    }

    /// Returns the next version of this record with the identifier list replaced.
    pub fn next_with(&self, data: PatientData) -> Self {
        let mut next = self.next_version();
        next.identifiers = data.identifiers;
        next
    }

    /// Returns the next version of this record, deactivated and linked to
    /// `target` with a `replaced-by` link.
    pub fn next_replaced_by(&self, target: &str) -> Self {
        let mut next = self.next_version();
        next.active = false;
        next.links.push(PatientLink::replaced_by(target));
        next
    }

    fn next_version(&self) -> Self {
        // Keep timestamps strictly increasing even if the clock stalls.
        let now = Utc::now().max(self.last_updated + chrono::Duration::microseconds(1));
        Self {
            id: self.id.clone(),
            version: self.version + 1,
            active: self.active,
            identifiers: self.identifiers.clone(),
            links: self.links.clone(),
            created_at: self.created_at,
            last_updated: now,
        }
    }

    /// Returns the record id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the version number (1-based).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the version number as a FHIR version id string.
    pub fn version_id(&self) -> String {
        self.version.to_string()
    }

    /// Returns whether the record is active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the identifiers in stored order.
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    /// Returns the links, oldest first.
    pub fn links(&self) -> &[PatientLink] {
        &self.links
    }

    /// Returns when the record was first created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when this version was committed.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Returns the relative reference `Patient/{id}`.
    pub fn reference(&self) -> String {
        format!("Patient/{}", self.id)
    }
}

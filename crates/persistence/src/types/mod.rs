//! Core types for the identity core.
//!
//! - [`PatientRecord`], [`PatientData`], [`PatientLink`] - patient records and their links
//! - [`Identifier`], [`DomainIdentifier`] - identifiers as stored and as reported by queries
//! - [`PatientQuery`], [`DateBound`], [`SortOrder`] - search criteria
//! - [`AuditEntry`], [`AuditOperation`] - audit trail entries
//!
//! # Examples
//!
//! ```
//! use patient_index_persistence::types::{Identifier, PatientData, PatientQuery};
//!
//! let data = PatientData::default()
//!     .with_identifier("urn:oid:1.1", "A")
//!     .with_identifier("urn:oid:2.2", "B");
//! assert_eq!(data.identifiers.len(), 2);
//!
//! let query = PatientQuery::new().with_identifier(Identifier::new("urn:oid:1.1", "A"));
//! assert!(query.identifier.is_some());
//! ```

mod audit;
mod identifier;
mod patient;
mod search;

pub use audit::{AuditEntry, AuditOperation};
pub use identifier::{
    DomainIdentifier, Identifier, OID_URN_PREFIX, candidate_systems, domain_of,
};
pub use patient::{LinkType, PatientData, PatientLink, PatientRecord};
pub use search::{DateBound, DatePrefix, PatientQuery, SortOrder};

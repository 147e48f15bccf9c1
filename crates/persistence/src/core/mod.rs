//! Core storage traits and components.
//!
//! - [`PatientStorage`] - the versioned record store
//! - [`VersionedStorage`] - version reads and instance history
//! - [`IdentifierLookup`] / [`IdentifierIndex`] - the identifier index
//! - [`PatientSearch`] - identifier and `_lastUpdated` search
//! - [`MergeStorage`] - the merge/link manager
//! - [`CrossReferenceResolver`] - domain-scoped cross-reference queries
//! - [`AuditStorage`] - the audit trail
//! - [`ChangeFeed`] - committed change events
//!
//! # Trait Hierarchy
//!
//! ```text
//! PatientStorage
//!     ├── VersionedStorage
//!     ├── IdentifierLookup ──> CrossReferenceResolver
//!     ├── PatientSearch
//!     └── MergeStorage
//!
//! AuditStorage
//! ChangeFeed
//! ```

pub mod audit;
pub mod events;
pub mod index;
pub mod merge;
pub mod resolver;
pub mod search;
pub mod storage;
pub mod versioned;

pub use audit::AuditStorage;
pub use events::{ChangeFeed, ChangeKind, PatientChange};
pub use index::IdentifierIndex;
pub use merge::{MergeResult, MergeStorage};
pub use resolver::{CrossReference, CrossReferenceResolver, QueryOutcome};
pub use search::{IdentifierLookup, PatientSearch};
pub use storage::PatientStorage;
pub use versioned::VersionedStorage;

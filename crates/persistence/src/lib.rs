//! Patient Index Persistence Layer
//!
//! This crate is the identity core of the patient index. It stores versioned
//! patient records, keeps an index over their identifiers, merges duplicate
//! records, and answers domain-scoped cross-reference queries. It knows nothing
//! about HTTP, FHIR wire formats or SOAP; protocol adapters translate their
//! requests into the operations defined here.
//!
//! # Architecture
//!
//! - [`types`] - Patient records, identifiers, search criteria and audit entries
//! - [`error`] - Error types for storage operations and cross-reference queries
//! - [`core`] - Storage traits, the identifier index and the resolver
//! - [`backends`] - Backend implementations
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use patient_index_persistence::backends::memory::InMemoryBackend;
//! use patient_index_persistence::core::{
//!     CrossReferenceResolver, MergeStorage, PatientStorage, QueryOutcome,
//! };
//! use patient_index_persistence::types::PatientData;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(InMemoryBackend::new());
//!
//! let a = store
//!     .create(PatientData::default().with_identifier("urn:oid:1.1", "A"), None)
//!     .await
//!     .unwrap();
//! let b = store
//!     .create(PatientData::default().with_identifier("urn:oid:2.2", "B"), None)
//!     .await
//!     .unwrap();
//!
//! // Find the holder of 1.1|A and list its identifiers in domain 2.2
//! let resolver = CrossReferenceResolver::new(Arc::clone(&store), "0.0.0");
//! let outcome = resolver.query("1.1", "A", &["2.2".to_string()]).await;
//! assert_eq!(outcome, QueryOutcome::NotFound);
//!
//! // Merging deactivates the source; its identifiers stop resolving
//! let merged = store.merge(a.id(), b.id()).await.unwrap();
//! assert!(!merged.source.is_active());
//! assert_eq!(resolver.query("1.1", "A", &[]).await, QueryOutcome::Error);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ResolveError, ResolveResult, StorageError, StorageResult};
pub use types::{DomainIdentifier, Identifier, PatientData, PatientRecord};

// Re-export core traits
pub use core::{
    AuditStorage, ChangeFeed, CrossReferenceResolver, IdentifierLookup, MergeStorage,
    PatientSearch, PatientStorage, QueryOutcome, VersionedStorage,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

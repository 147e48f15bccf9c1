//! Application state for the patient index.
//!
//! This module defines the shared application state that is available to all
//! request handlers: the storage backend, the cross-reference resolver built
//! on it, and the server configuration.

use std::sync::Arc;

use patient_index_persistence::core::{
    AuditStorage, CrossReferenceResolver, IdentifierLookup, MergeStorage, PatientSearch,
    VersionedStorage,
};

use crate::config::ServerConfig;

/// Storage capabilities the HTTP layer needs from a backend.
///
/// Implemented for every type that provides all of them.
pub trait PatientIndexBackend:
    VersionedStorage + IdentifierLookup + PatientSearch + MergeStorage + AuditStorage + 'static
{
}

impl<T> PatientIndexBackend for T where
    T: VersionedStorage + IdentifierLookup + PatientSearch + MergeStorage + AuditStorage + 'static
{
}

/// Shared application state.
///
/// # Type Parameters
///
/// * `S` - The storage backend type
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use patient_index_persistence::backends::memory::InMemoryBackend;
/// use patient_index_rest::{AppState, ServerConfig};
///
/// let state = AppState::new(Arc::new(InMemoryBackend::new()), ServerConfig::default());
/// assert_eq!(state.resolver().local_domain(), "0.0.0");
/// ```
pub struct AppState<S> {
    /// The storage backend.
    storage: Arc<S>,

    /// Resolver answering PIX queries against `storage`.
    resolver: CrossReferenceResolver<S>,

    /// Server configuration.
    config: Arc<ServerConfig>,
}

// S sits behind an Arc and need not be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            resolver: self.resolver.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: PatientIndexBackend> AppState<S> {
    /// Creates a new AppState with the given storage and configuration.
    ///
    /// The resolver uses `config.pid_domain` as the record-id domain.
    pub fn new(storage: Arc<S>, config: ServerConfig) -> Self {
        let resolver = CrossReferenceResolver::new(Arc::clone(&storage), config.pid_domain.clone());
        Self {
            storage,
            resolver,
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the cross-reference resolver.
    pub fn resolver(&self) -> &CrossReferenceResolver<S> {
        &self.resolver
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the base URL for the server.
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// Returns the absolute URL of a patient record.
    pub fn patient_url(&self, id: &str) -> String {
        format!("{}/Patient/{}", self.base_url(), id)
    }
}

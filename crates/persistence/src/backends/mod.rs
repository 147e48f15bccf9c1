//! Storage backend implementations.
//!
//! # Available Backends
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`memory`] | Process-local store with an in-memory identifier index and audit log |
//!
//! # Example
//!
//! ```
//! use patient_index_persistence::backends::memory::{InMemoryBackend, InMemoryBackendConfig};
//!
//! let backend = InMemoryBackend::new();
//!
//! let config = InMemoryBackendConfig {
//!     audit_capacity: 500,
//!     ..Default::default()
//! };
//! let bounded = InMemoryBackend::with_config(config);
//! ```

pub mod memory;

//! In-memory backend implementation.
//!
//! Records, their version history and the identifier index live behind a single
//! reader-writer lock. Every mutation takes the write lock once, validates,
//! then commits the new record version and the matching index change before
//! releasing it, so the index never disagrees with the store and no two
//! writers can interleave. Merges touch two records under that same lock,
//! which gives them a fixed lock order for free.
//!
//! Reads take the shared lock and clone what they return, so every caller sees
//! a whole record version.
//!
//! # Features
//!
//! - Full version history for vread and `_history`
//! - Identifier index with active-owner semantics
//! - Bounded audit log
//! - Change events on a broadcast channel

mod backend;
mod storage;

pub use backend::{InMemoryBackend, InMemoryBackendConfig};

//! Shared helpers for persistence integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use patient_index_persistence::backends::memory::InMemoryBackend;
use patient_index_persistence::core::PatientStorage;
use patient_index_persistence::types::{Identifier, PatientData, PatientRecord};

/// Domain under which record ids are queried.
pub const PID_DOMAIN: &str = "0.0.0";

/// Creates an empty backend.
pub fn create_backend() -> Arc<InMemoryBackend> {
    Arc::new(InMemoryBackend::new())
}

/// Builds patient data from `(system, value)` pairs.
pub fn patient_data(identifiers: &[(&str, &str)]) -> PatientData {
    PatientData::new(
        identifiers
            .iter()
            .map(|(system, value)| Identifier::new(*system, *value))
            .collect(),
    )
}

/// Creates a patient with a generated id.
pub async fn create_patient(
    backend: &InMemoryBackend,
    identifiers: &[(&str, &str)],
) -> PatientRecord {
    backend
        .create(patient_data(identifiers), None)
        .await
        .expect("Failed to create patient")
}

/// Creates a patient with a caller-chosen id.
pub async fn create_patient_with_id(
    backend: &InMemoryBackend,
    id: &str,
    identifiers: &[(&str, &str)],
) -> PatientRecord {
    backend
        .create(patient_data(identifiers), Some(id))
        .await
        .expect("Failed to create patient")
}

/// Sorts identifiers for order-insensitive comparison.
pub fn sorted(identifiers: &[Identifier]) -> Vec<Identifier> {
    let mut identifiers = identifiers.to_vec();
    identifiers.sort();
    identifiers
}

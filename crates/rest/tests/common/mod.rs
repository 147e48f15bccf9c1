//! Shared test setup for the HTTP surface.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use patient_index_persistence::backends::memory::{InMemoryBackend, InMemoryBackendConfig};
use patient_index_persistence::core::PatientStorage;
use patient_index_persistence::{PatientData, PatientRecord};
use patient_index_rest::{AppState, ServerConfig, routing};
use serde_json::{Value, json};

pub const BASE_URL: &str = "http://localhost:8080";

/// Creates a test server over a fresh in-memory backend.
///
/// The backend is returned as well so tests can seed and inspect it directly.
pub fn create_test_server() -> (TestServer, Arc<InMemoryBackend>) {
    create_test_server_with(ServerConfig::for_testing())
}

/// Creates a test server with a custom configuration.
pub fn create_test_server_with(config: ServerConfig) -> (TestServer, Arc<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::with_config(InMemoryBackendConfig {
        audit_capacity: config.audit_capacity,
        ..Default::default()
    }));

    let config = ServerConfig {
        base_url: BASE_URL.to_string(),
        ..config
    };
    let state = AppState::new(Arc::clone(&backend), config);
    let server = TestServer::new(routing::create_routes(state)).expect("Failed to create test server");

    (server, backend)
}

/// A Patient body with the given `(system, value)` identifiers.
pub fn patient_json(identifiers: &[(&str, &str)]) -> Value {
    let identifiers: Vec<Value> = identifiers
        .iter()
        .map(|(system, value)| json!({ "system": system, "value": value }))
        .collect();
    json!({ "resourceType": "Patient", "identifier": identifiers })
}

/// Stores a patient directly in the backend.
pub async fn seed_patient(backend: &InMemoryBackend, identifiers: &[(&str, &str)]) -> PatientRecord {
    let data = identifiers
        .iter()
        .fold(PatientData::default(), |data, (system, value)| {
            data.with_identifier(*system, *value)
        });
    backend.create(data, None).await.expect("Failed to seed patient")
}

/// A `$merge` Parameters body.
pub fn merge_parameters(source: &str, target: &str) -> Value {
    json!({
        "resourceType": "Parameters",
        "parameter": [
            { "name": "source-patient", "valueReference": { "reference": format!("Patient/{}", source) } },
            { "name": "target-patient", "valueReference": { "reference": format!("Patient/{}", target) } }
        ]
    })
}

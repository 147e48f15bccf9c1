//! Concurrent access tests for the in-memory backend.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use patient_index_persistence::core::{
    CrossReferenceResolver, IdentifierLookup, MergeStorage, PatientStorage, QueryOutcome,
    VersionedStorage,
};
use patient_index_persistence::error::StorageError;
use patient_index_persistence::types::DomainIdentifier;

use common::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_are_not_lost() {
    let backend = create_backend();
    let patient = create_patient(&backend, &[]).await;

    let mut handles = Vec::new();
    for i in 0..50 {
        let backend = Arc::clone(&backend);
        let id = patient.id().to_string();
        handles.push(tokio::spawn(async move {
            let value = i.to_string();
            backend
                .update(&id, patient_data(&[("s", value.as_str())]))
                .await
                .map(|record| record.version())
        }));
    }

    let mut versions = HashSet::new();
    for handle in handles {
        versions.insert(handle.await.unwrap().unwrap());
    }

    // Every update produced its own version
    assert_eq!(versions.len(), 50);
    assert_eq!(versions.iter().min(), Some(&2));
    assert_eq!(versions.iter().max(), Some(&51));
    assert_eq!(backend.history(patient.id()).await.unwrap().len(), 51);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_of_one_identifier() {
    let backend = create_backend();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let backend = Arc::clone(&backend);
        handles.push(tokio::spawn(async move {
            backend.create(patient_data(&[("urn:oid:1.1", "contested")]), None).await
        }));
    }

    let mut winners = Vec::new();
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(record) => winners.push(record),
            Err(StorageError::IdentifierConflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(conflicts, 19);
    assert_eq!(
        backend.lookup_by_identifier("urn:oid:1.1", "contested").await.unwrap(),
        winners[0].id()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crossing_merges_do_not_deadlock() {
    let backend = create_backend();
    let a = create_patient(&backend, &[]).await;
    let b = create_patient(&backend, &[]).await;

    let first = {
        let backend = Arc::clone(&backend);
        let (a, b) = (a.id().to_string(), b.id().to_string());
        tokio::spawn(async move { backend.merge(&a, &b).await })
    };
    let second = {
        let backend = Arc::clone(&backend);
        let (a, b) = (a.id().to_string(), b.id().to_string());
        tokio::spawn(async move { backend.merge(&b, &a).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];

    // Exactly one direction wins; the other finds an inactive participant
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(r, Err(StorageError::InvalidMerge { .. }))));

    let a = backend.read(a.id()).await.unwrap();
    let b = backend.read(b.id()).await.unwrap();
    assert_ne!(a.is_active(), b.is_active());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queries_see_whole_identifier_sets() {
    let backend = create_backend();
    let patient = create_patient(&backend, &[("urn:oid:1.1", "A"), ("urn:oid:2.2", "B0")]).await;
    let resolver = CrossReferenceResolver::new(Arc::clone(&backend), PID_DOMAIN);

    let writer = {
        let backend = Arc::clone(&backend);
        let id = patient.id().to_string();
        tokio::spawn(async move {
            for i in 1..100 {
                let value = format!("B{}", i);
                backend
                    .update(&id, patient_data(&[("urn:oid:1.1", "A"), ("urn:oid:2.2", value.as_str())]))
                    .await
                    .unwrap();
            }
        })
    };

    let reader = {
        let id = patient.id().to_string();
        tokio::spawn(async move {
            for _ in 0..100 {
                match resolver.query(PID_DOMAIN, &id, &[]).await {
                    QueryOutcome::Ok(identifiers) => assert_eq!(identifiers.len(), 2),
                    other => panic!("unexpected outcome: {:?}", other),
                }
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_identifier_query_never_reports_a_later_set() {
    let backend = create_backend();
    let patient = create_patient(&backend, &[("urn:oid:1.1", "A"), ("urn:oid:2.2", "B")]).await;
    let resolver = CrossReferenceResolver::new(Arc::clone(&backend), PID_DOMAIN);

    let writer = {
        let backend = Arc::clone(&backend);
        let id = patient.id().to_string();
        tokio::spawn(async move {
            for i in 0..200 {
                let identifiers: &[(&str, &str)] = if i % 2 == 0 {
                    &[("urn:oid:1.1", "Z"), ("urn:oid:2.2", "C")]
                } else {
                    &[("urn:oid:1.1", "A"), ("urn:oid:2.2", "B")]
                };
                backend.update(&id, patient_data(identifiers)).await.unwrap();
            }
        })
    };

    let reader = tokio::spawn(async move {
        for _ in 0..200 {
            match resolver.query("1.1", "A", &[]).await {
                QueryOutcome::Ok(identifiers) => assert_eq!(
                    identifiers,
                    vec![DomainIdentifier::new("1.1", "A"), DomainIdentifier::new("2.2", "B")]
                ),
                QueryOutcome::Error => {}
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
    });

    writer.await.unwrap();
    reader.await.unwrap();
}

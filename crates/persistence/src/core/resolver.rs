//! Domain-scoped cross-reference resolver.
//!
//! Given one identifier, the resolver finds the active patient that holds it and
//! reports that patient's identifiers in a requested set of domains. Outcomes
//! are classified as [`QueryOutcome::Error`] when the queried identifier does
//! not resolve, [`QueryOutcome::NotFound`] when it resolves but nothing matches
//! the domain filter, and [`QueryOutcome::Ok`] otherwise.
//!
//! ```text
//! Start ──> Resolving ──> Error
//!               │
//!               └──> Resolved ──> Filtering ──> NotFound
//!                                     │
//!                                     └──> Ok
//! ```
//!
//! The resolver holds no state between queries.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ResolveError, ResolveResult, StorageError};
use crate::types::{DomainIdentifier, Identifier, candidate_systems, domain_of};

use super::search::IdentifierLookup;

/// Protocol-neutral outcome of a cross-reference query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The identity resolved; carries the matching identifiers.
    Ok(Vec<DomainIdentifier>),
    /// The identity resolved but holds nothing in the requested domains.
    NotFound,
    /// The queried identifier does not resolve, or the query failed.
    Error,
}

impl QueryOutcome {
    /// Classifies a resolver result.
    pub fn classify(result: &ResolveResult<Vec<DomainIdentifier>>) -> Self {
        match result {
            Ok(identifiers) => QueryOutcome::Ok(identifiers.clone()),
            Err(ResolveError::NoMatchingDomain { .. }) => QueryOutcome::NotFound,
            Err(ResolveError::UnknownIdentity { .. }) | Err(ResolveError::Storage(_)) => {
                QueryOutcome::Error
            }
        }
    }

    /// Returns the identifiers carried by an `Ok` outcome, or an empty slice.
    pub fn identifiers(&self) -> &[DomainIdentifier] {
        match self {
            QueryOutcome::Ok(identifiers) => identifiers,
            QueryOutcome::NotFound | QueryOutcome::Error => &[],
        }
    }
}

/// A resolved cross-reference: the patient found and the identifiers reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReference {
    /// Id of the active patient holding the queried identifier.
    pub patient_id: String,
    /// The patient's identifiers within the requested domains.
    pub identifiers: Vec<DomainIdentifier>,
}

/// Answers cross-reference queries against an identifier-indexed store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use patient_index_persistence::backends::memory::InMemoryBackend;
/// use patient_index_persistence::core::{CrossReferenceResolver, PatientStorage, QueryOutcome};
/// use patient_index_persistence::types::{DomainIdentifier, PatientData};
///
/// # tokio_test::block_on(async {
/// let store = Arc::new(InMemoryBackend::new());
/// let data = PatientData::default()
///     .with_identifier("urn:oid:1.1", "A")
///     .with_identifier("urn:oid:2.2", "B");
/// let patient = store.create(data, None).await.unwrap();
///
/// let resolver = CrossReferenceResolver::new(store, "0.0.0");
/// let outcome = resolver.query("0.0.0", patient.id(), &["1.1".to_string()]).await;
/// assert_eq!(outcome, QueryOutcome::Ok(vec![DomainIdentifier::new("1.1", "A")]));
/// # });
/// ```
#[derive(Debug)]
pub struct CrossReferenceResolver<S: ?Sized> {
    storage: Arc<S>,
    local_domain: String,
}

impl<S: ?Sized> Clone for CrossReferenceResolver<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            local_domain: self.local_domain.clone(),
        }
    }
}

impl<S> CrossReferenceResolver<S>
where
    S: IdentifierLookup + ?Sized,
{
    /// Creates a resolver whose resource-id domain is `local_domain`.
    pub fn new(storage: Arc<S>, local_domain: impl Into<String>) -> Self {
        Self {
            storage,
            local_domain: local_domain.into(),
        }
    }

    /// Returns the domain under which record ids are themselves identifiers.
    pub fn local_domain(&self) -> &str {
        &self.local_domain
    }

    /// Resolves `domain|value` and returns the patient's identifiers in
    /// `target_domains`, or all of them when `target_domains` is empty.
    ///
    /// # Errors
    ///
    /// * `ResolveError::UnknownIdentity` - If no active patient holds the identifier
    /// * `ResolveError::NoMatchingDomain` - If the patient holds nothing in a non-empty filter
    /// * `ResolveError::Storage` - If the store fails
    pub async fn resolve(
        &self,
        domain: &str,
        value: &str,
        target_domains: &[String],
    ) -> ResolveResult<Vec<DomainIdentifier>> {
        Ok(self.cross_reference(domain, value, target_domains).await?.identifiers)
    }

    /// Like [`resolve`](Self::resolve), but also reports which patient the
    /// queried identifier resolved to.
    pub async fn cross_reference(
        &self,
        domain: &str,
        value: &str,
        target_domains: &[String],
    ) -> ResolveResult<CrossReference> {
        debug!(domain = %domain, value = %value, targets = ?target_domains, "Resolving identity");

        let (patient_id, owned) = self.resolve_patient(domain, value).await?;

        let identifiers: Vec<DomainIdentifier> = owned
            .iter()
            .filter(|identifier| {
                target_domains.is_empty()
                    || target_domains.iter().any(|target| identifier.in_domain(target))
            })
            .map(DomainIdentifier::from)
            .collect();

        if identifiers.is_empty() && !target_domains.is_empty() {
            debug!(patient_id = %patient_id, "No identifiers in requested domains");
            return Err(ResolveError::NoMatchingDomain { patient_id });
        }

        Ok(CrossReference {
            patient_id,
            identifiers,
        })
    }

    /// Runs [`resolve`](Self::resolve) and classifies the result.
    pub async fn query(&self, domain: &str, value: &str, target_domains: &[String]) -> QueryOutcome {
        self.query_with_patient(domain, value, target_domains).await.0
    }

    /// Classifies a query and returns the resolved patient id alongside,
    /// `None` when the queried identifier did not resolve.
    pub async fn query_with_patient(
        &self,
        domain: &str,
        value: &str,
        target_domains: &[String],
    ) -> (QueryOutcome, Option<String>) {
        let result = self.cross_reference(domain, value, target_domains).await;
        let patient_id = match &result {
            Ok(found) => Some(found.patient_id.clone()),
            Err(ResolveError::NoMatchingDomain { patient_id }) => Some(patient_id.clone()),
            Err(ResolveError::Storage(err)) => {
                warn!(error = %err, "Cross-reference query failed");
                None
            }
            Err(ResolveError::UnknownIdentity { .. }) => None,
        };
        let outcome = QueryOutcome::classify(&result.map(|found| found.identifiers));
        (outcome, patient_id)
    }

    /// Finds the active patient holding `domain|value` and its identifiers,
    /// taken from the same snapshot.
    async fn resolve_patient(
        &self,
        domain: &str,
        value: &str,
    ) -> ResolveResult<(String, Vec<Identifier>)> {
        let unknown = || ResolveError::UnknownIdentity {
            domain: domain.to_string(),
            value: value.to_string(),
        };

        if domain_of(domain) == domain_of(&self.local_domain) {
            return match self.storage.active_identifiers(value).await {
                Ok(identifiers) => Ok((value.to_string(), identifiers)),
                Err(StorageError::NotFound { .. }) => Err(unknown()),
                Err(err) => Err(err.into()),
            };
        }

        for system in candidate_systems(domain) {
            match self.storage.holder_of(&system, value).await {
                Ok(found) => return Ok(found),
                Err(StorageError::IdentifierNotFound { .. }) => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Err(unknown())
    }
}

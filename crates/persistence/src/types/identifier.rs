//! Identifier types.
//!
//! An [`Identifier`] is a `(system, value)` pair as stored on a patient record.
//! The system names the issuing authority. Systems written as `urn:oid:{oid}`
//! are reported to cross-reference callers under the bare OID, which is the
//! identifier's *domain*.

use std::fmt;

use serde::{Deserialize, Serialize};

/// URN prefix used for OID-based identifier systems.
pub const OID_URN_PREFIX: &str = "urn:oid:";

/// A patient identifier issued by some assigning authority.
///
/// Equality is exact: no case folding or whitespace normalization is applied
/// to either part.
///
/// # Examples
///
/// ```
/// use patient_index_persistence::types::Identifier;
///
/// let id = Identifier::new("urn:oid:1.2.3", "MRN-42");
/// assert_eq!(id.domain(), "1.2.3");
/// assert_eq!(id.to_string(), "urn:oid:1.2.3|MRN-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    /// The identifier system (issuing authority).
    pub system: String,
    /// The identifier value, unique within its system.
    pub value: String,
}

impl Identifier {
    /// Creates a new identifier.
    pub fn new(system: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            value: value.into(),
        }
    }

    /// Returns the domain of this identifier: the system without a leading
    /// `urn:oid:` prefix.
    pub fn domain(&self) -> &str {
        domain_of(&self.system)
    }

    /// Returns true if this identifier belongs to `domain`.
    ///
    /// Both sides are compared after stripping any `urn:oid:` prefix.
    pub fn in_domain(&self, domain: &str) -> bool {
        self.domain() == domain_of(domain)
    }

    /// Parses a FHIR token of the form `system|value`.
    ///
    /// Returns `None` if the separator is missing or either side is empty.
    pub fn parse_token(token: &str) -> Option<Self> {
        let (system, value) = token.split_once('|')?;
        if system.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self::new(system, value))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.system, self.value)
    }
}

/// Strips a leading `urn:oid:` from a system or domain string.
pub fn domain_of(system: &str) -> &str {
    system.strip_prefix(OID_URN_PREFIX).unwrap_or(system)
}

/// Returns the identifier systems that may carry identifiers of `domain`,
/// in lookup order: the literal string first, then its OID URN counterpart.
pub fn candidate_systems(domain: &str) -> Vec<String> {
    match domain.strip_prefix(OID_URN_PREFIX) {
        Some(bare) => vec![domain.to_string(), bare.to_string()],
        None => vec![domain.to_string(), format!("{}{}", OID_URN_PREFIX, domain)],
    }
}

/// An identifier as reported by a cross-reference query: a domain (bare OID
/// for `urn:oid:` systems) and a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainIdentifier {
    /// The assigning authority, without any `urn:oid:` prefix.
    pub domain: String,
    /// The identifier value.
    pub value: String,
}

impl DomainIdentifier {
    /// Creates a new domain identifier.
    pub fn new(domain: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            value: value.into(),
        }
    }
}

impl From<&Identifier> for DomainIdentifier {
    fn from(identifier: &Identifier) -> Self {
        Self::new(identifier.domain(), identifier.value.clone())
    }
}

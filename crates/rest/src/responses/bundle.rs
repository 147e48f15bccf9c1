//! Bundle response building.

use serde_json::{Value, json};

/// Bundle types returned by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleType {
    /// Search results bundle.
    Searchset,
    /// History results bundle.
    History,
}

impl BundleType {
    /// Returns the FHIR code.
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleType::Searchset => "searchset",
            BundleType::History => "history",
        }
    }
}

/// The request and response recorded in a history entry.
#[derive(Debug, Clone)]
pub struct HistoryEntryTransaction {
    /// HTTP method that produced the version.
    pub method: &'static str,
    /// Relative request URL.
    pub url: String,
    /// HTTP status of the original interaction.
    pub status: String,
    /// ETag of the version.
    pub etag: String,
    /// When the version was committed.
    pub last_modified: String,
}

/// An entry in a Bundle.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    /// Full URL of the resource.
    pub full_url: String,
    /// The resource itself.
    pub resource: Value,
    /// Whether this is a search match.
    pub search_match: bool,
    /// Request and response for history entries.
    pub transaction: Option<HistoryEntryTransaction>,
}

impl BundleEntry {
    /// Creates a search match entry.
    pub fn search_result(resource: Value, full_url: impl Into<String>) -> Self {
        Self {
            full_url: full_url.into(),
            resource,
            search_match: true,
            transaction: None,
        }
    }

    /// Creates a history entry.
    pub fn history(
        resource: Value,
        full_url: impl Into<String>,
        transaction: HistoryEntryTransaction,
    ) -> Self {
        Self {
            full_url: full_url.into(),
            resource,
            search_match: false,
            transaction: Some(transaction),
        }
    }

    /// Converts to FHIR JSON.
    pub fn to_json(&self) -> Value {
        let mut entry = json!({
            "fullUrl": self.full_url,
            "resource": self.resource
        });

        if self.search_match {
            entry["search"] = json!({ "mode": "match" });
        }

        if let Some(transaction) = &self.transaction {
            entry["request"] = json!({
                "method": transaction.method,
                "url": transaction.url
            });
            entry["response"] = json!({
                "status": transaction.status,
                "etag": transaction.etag,
                "lastModified": transaction.last_modified
            });
        }

        entry
    }
}

/// Builder for Bundle resources.
#[derive(Debug)]
pub struct BundleBuilder {
    bundle_type: BundleType,
    self_link: Option<String>,
    entries: Vec<BundleEntry>,
}

impl BundleBuilder {
    /// Creates a builder for a specific bundle type.
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            bundle_type,
            self_link: None,
            entries: Vec::new(),
        }
    }

    /// Creates a searchset bundle builder.
    pub fn searchset() -> Self {
        Self::new(BundleType::Searchset)
    }

    /// Creates a history bundle builder.
    pub fn history() -> Self {
        Self::new(BundleType::History)
    }

    /// Sets the self link.
    pub fn self_link(mut self, url: impl Into<String>) -> Self {
        self.self_link = Some(url.into());
        self
    }

    /// Adds an entry.
    pub fn add_entry(mut self, entry: BundleEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Builds the Bundle resource. `total` is the number of entries.
    pub fn build(self) -> Value {
        let mut bundle = json!({
            "resourceType": "Bundle",
            "type": self.bundle_type.as_str(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "total": self.entries.len()
        });

        if let Some(url) = self.self_link {
            bundle["link"] = json!([{ "relation": "self", "url": url }]);
        }

        bundle["entry"] = json!(self.entries.iter().map(BundleEntry::to_json).collect::<Vec<_>>());

        bundle
    }
}

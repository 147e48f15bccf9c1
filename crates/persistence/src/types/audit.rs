//! Audit trail entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The operation that touched a patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditOperation {
    /// A record was created.
    Create,
    /// A record was read.
    Read,
    /// A record was updated.
    Update,
    /// A record matched a search.
    Search,
    /// A record was merged into another.
    Merge,
    /// A record answered a PIX cross-reference query.
    PixQuery,
}

impl AuditOperation {
    /// Returns the FHIR AuditEvent action code (C, R, U, E).
    pub fn action_code(&self) -> &'static str {
        match self {
            AuditOperation::Create => "C",
            AuditOperation::Read => "R",
            AuditOperation::Update => "U",
            AuditOperation::Search | AuditOperation::Merge | AuditOperation::PixQuery => "E",
        }
    }

    /// Returns a stable code naming the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOperation::Create => "create",
            AuditOperation::Read => "read",
            AuditOperation::Update => "update",
            AuditOperation::Search => "search",
            AuditOperation::Merge => "merge",
            AuditOperation::PixQuery => "pix-query",
        }
    }
}

/// One entry in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry id.
    pub id: String,
    /// What happened.
    pub operation: AuditOperation,
    /// The patient record involved.
    pub patient_id: String,
    /// When it happened.
    pub recorded_at: DateTime<Utc>,
    /// The query text for searches and PIX queries.
    pub query: Option<String>,
}

impl AuditEntry {
    /// Creates an entry recorded now.
    pub fn new(operation: AuditOperation, patient_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            operation,
            patient_id: patient_id.into(),
            recorded_at: Utc::now(),
            query: None,
        }
    }

    /// Attaches the query text.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

//! OperationOutcome generation.

use serde_json::{Value, json};

/// Issue severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Processing has failed.
    Error,
    /// Processing succeeded with concerns.
    Warning,
    /// Informational message.
    Information,
}

impl IssueSeverity {
    /// Returns the FHIR code.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Information => "information",
        }
    }
}

/// Issue type codes used by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueType {
    /// Invalid content.
    Invalid,
    /// Required element missing.
    Required,
    /// Record or version not found.
    NotFound,
    /// Conflict with existing state.
    Conflict,
    /// Duplicate record or identifier.
    Duplicate,
    /// Request understood but not applicable.
    Processing,
    /// Content type or feature not supported.
    NotSupported,
    /// Unexpected internal failure.
    Exception,
    /// Informational message.
    Informational,
}

impl IssueType {
    /// Returns the FHIR code.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Invalid => "invalid",
            IssueType::Required => "required",
            IssueType::NotFound => "not-found",
            IssueType::Conflict => "conflict",
            IssueType::Duplicate => "duplicate",
            IssueType::Processing => "processing",
            IssueType::NotSupported => "not-supported",
            IssueType::Exception => "exception",
            IssueType::Informational => "informational",
        }
    }
}

/// An issue in an OperationOutcome.
#[derive(Debug, Clone)]
pub struct Issue {
    /// The severity of the issue.
    pub severity: IssueSeverity,
    /// The issue type.
    pub code: IssueType,
    /// Human-readable description.
    pub details: String,
    /// FHIRPath location of the problem.
    pub expression: Option<String>,
}

impl Issue {
    /// Creates a new issue.
    pub fn new(severity: IssueSeverity, code: IssueType, details: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            details: details.into(),
            expression: None,
        }
    }

    /// Sets the location expression.
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// Converts to FHIR JSON.
    pub fn to_json(&self) -> Value {
        let mut issue = json!({
            "severity": self.severity.as_str(),
            "code": self.code.as_str(),
            "details": { "text": self.details }
        });

        if let Some(expression) = &self.expression {
            issue["expression"] = json!([expression]);
        }

        issue
    }
}

/// Builder for OperationOutcome resources.
#[derive(Debug, Default)]
pub struct OperationOutcomeBuilder {
    issues: Vec<Issue>,
}

impl OperationOutcomeBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an issue.
    pub fn add_issue(mut self, issue: Issue) -> Self {
        self.issues.push(issue);
        self
    }

    /// Adds an error issue.
    pub fn error(self, code: IssueType, details: impl Into<String>) -> Self {
        self.add_issue(Issue::new(IssueSeverity::Error, code, details))
    }

    /// Adds an information issue.
    pub fn information(self, code: IssueType, details: impl Into<String>) -> Self {
        self.add_issue(Issue::new(IssueSeverity::Information, code, details))
    }

    /// Builds the OperationOutcome resource.
    pub fn build(self) -> Value {
        json!({
            "resourceType": "OperationOutcome",
            "issue": self.issues.iter().map(Issue::to_json).collect::<Vec<_>>()
        })
    }
}

/// Creates an OperationOutcome with a single error issue.
pub fn error_outcome(code: IssueType, message: &str) -> Value {
    OperationOutcomeBuilder::new().error(code, message).build()
}

/// Creates an OperationOutcome with a single informational issue.
pub fn information_outcome(message: &str) -> Value {
    OperationOutcomeBuilder::new()
        .information(IssueType::Informational, message)
        .build()
}

//! Error types for SOAP and HL7v3 message handling.

use thiserror::Error;

/// Errors produced while reading or writing SOAP and HL7v3 messages.
#[derive(Error, Debug)]
pub enum Hl7v3Error {
    /// The input is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Writing the output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is well-formed but malformed in some other way, such as
    /// unbalanced tags or an unknown entity.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// The document is not a SOAP 1.2 envelope with a body.
    #[error("not a SOAP 1.2 envelope: {0}")]
    NotSoapEnvelope(String),

    /// A required element or attribute is missing.
    #[error("missing {0}")]
    Missing(String),

    /// The query parameters are present but unusable.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Result type alias for HL7v3 operations.
pub type Result<T> = std::result::Result<T, Hl7v3Error>;

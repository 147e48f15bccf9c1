//! HL7v3 PIX Query Messaging
//!
//! This crate reads and writes the messages of the HL7v3 Patient Identifier
//! Cross-referencing query: a PRPA_IN201309UV02 request carried in a SOAP 1.2
//! envelope, answered by a PRPA_IN201310UV02 response. It has no knowledge of
//! how identities are resolved; callers turn a [`PixQuery`] into a
//! [`PixOutcome`] and hand it back for serialization.
//!
//! # Modules
//!
//! - [`xml`] - Owned element trees with prefix-insensitive path queries
//! - [`soap`] - SOAP 1.2 envelopes and faults
//! - [`query`] - Request parsing
//! - [`response`] - Response building
//!
//! # Example
//!
//! ```
//! use patient_index_hl7v3::{PixOutcome, PixQuery, render_response};
//!
//! let request = r#"<soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope">
//!   <soap:Body>
//!     <PRPA_IN201309UV02 xmlns="urn:hl7-org:v3">
//!       <id root="req-1"/>
//!       <controlActProcess classCode="CACT" moodCode="EVN">
//!         <queryByParameter>
//!           <parameterList>
//!             <patientIdentifier><value root="1.1" extension="A"/></patientIdentifier>
//!           </parameterList>
//!         </queryByParameter>
//!       </controlActProcess>
//!     </PRPA_IN201309UV02>
//!   </soap:Body>
//! </soap:Envelope>"#;
//!
//! let query = PixQuery::from_soap(request).unwrap();
//! assert_eq!(query.query_domain(), "1.1");
//!
//! let xml = render_response(&query, &PixOutcome::NotFound).unwrap();
//! assert!(xml.contains("PRPA_IN201310UV02"));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod query;
pub mod response;
pub mod soap;
pub mod xml;

pub use error::{Hl7v3Error, Result};
pub use query::{InstanceIdentifier, PixQuery};
pub use response::{PixOutcome, PixResponseBuilder};
pub use xml::XmlElement;

/// HL7v3 namespace.
pub const HL7V3_NS: &str = "urn:hl7-org:v3";

/// Root OID of HL7 interaction and trigger event identifiers.
pub const INTERACTION_ID_ROOT: &str = "2.16.840.1.113883.1.6";

/// Interaction id of the PIX query.
pub const QUERY_INTERACTION: &str = "PRPA_IN201309UV02";

/// Interaction id of the PIX query response.
pub const RESPONSE_INTERACTION: &str = "PRPA_IN201310UV02";

/// Trigger event code of the PIX query response.
pub const RESPONSE_TRIGGER: &str = "PRPA_TE201310UV02";

/// SOAP action of the PIX query.
pub const QUERY_SOAP_ACTION: &str = "urn:hl7-org:v3:PRPA_IN201309UV02";

/// Builds the response to `query` and serializes it inside a SOAP 1.2 envelope.
pub fn render_response(query: &PixQuery, outcome: &PixOutcome) -> Result<String> {
    let response = PixResponseBuilder::new(query).build(outcome);
    soap::envelope(response).to_xml()
}

/// Serializes a SOAP 1.2 `Sender` fault.
pub fn render_sender_fault(reason: &str) -> Result<String> {
    soap::fault(soap::FaultCode::Sender, reason).to_xml()
}

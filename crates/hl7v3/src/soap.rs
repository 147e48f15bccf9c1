//! SOAP 1.2 envelopes and faults.

use crate::error::{Hl7v3Error, Result};
use crate::xml::XmlElement;

/// SOAP 1.2 envelope namespace.
pub const SOAP_ENVELOPE_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Media type of SOAP 1.2 messages.
pub const SOAP_CONTENT_TYPE: &str = "application/soap+xml; charset=utf-8";

/// Who caused a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCode {
    /// The message was malformed or unusable.
    Sender,
    /// The receiver failed while processing a valid message.
    Receiver,
}

impl FaultCode {
    /// Returns the qualified fault code value.
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultCode::Sender => "soap:Sender",
            FaultCode::Receiver => "soap:Receiver",
        }
    }
}

/// Returns the single payload element inside the body of a SOAP 1.2 envelope.
///
/// # Errors
///
/// * `Hl7v3Error::NotSoapEnvelope` - If the root is not a SOAP 1.2 `Envelope`,
///   or its `Body` does not hold exactly one element
pub fn body_payload(envelope: &XmlElement) -> Result<&XmlElement> {
    if envelope.local_name() != "Envelope" {
        return Err(Hl7v3Error::NotSoapEnvelope(format!(
            "root element is '{}'",
            envelope.name()
        )));
    }

    let declares_soap12 = envelope
        .attributes()
        .iter()
        .any(|(key, value)| key.starts_with("xmlns") && value == SOAP_ENVELOPE_NS);
    if !declares_soap12 {
        return Err(Hl7v3Error::NotSoapEnvelope(
            "envelope does not use the SOAP 1.2 namespace".to_string(),
        ));
    }

    let body = envelope
        .child("Body")
        .ok_or_else(|| Hl7v3Error::NotSoapEnvelope("no Body element".to_string()))?;

    match body.children() {
        [payload] => Ok(payload),
        [] => Err(Hl7v3Error::NotSoapEnvelope("empty Body".to_string())),
        _ => Err(Hl7v3Error::NotSoapEnvelope(
            "Body holds more than one element".to_string(),
        )),
    }
}

/// Wraps `payload` in a SOAP 1.2 envelope.
pub fn envelope(payload: XmlElement) -> XmlElement {
    XmlElement::new("soap:Envelope")
        .with_attr("xmlns:soap", SOAP_ENVELOPE_NS)
        .with_child(XmlElement::new("soap:Body").with_child(payload))
}

/// Builds a SOAP 1.2 fault envelope.
pub fn fault(code: FaultCode, reason: &str) -> XmlElement {
    let fault = XmlElement::new("soap:Fault")
        .with_child(
            XmlElement::new("soap:Code")
                .with_child(XmlElement::new("soap:Value").with_text(code.as_str())),
        )
        .with_child(
            XmlElement::new("soap:Reason").with_child(
                XmlElement::new("soap:Text")
                    .with_attr("xml:lang", "en")
                    .with_text(reason),
            ),
        );
    envelope(fault)
}

//! PIX query requests (PRPA_IN201309UV02).

use crate::error::{Hl7v3Error, Result};
use crate::soap;
use crate::xml::XmlElement;
use crate::QUERY_INTERACTION;

/// An HL7v3 instance identifier (`II`): an assigning authority root and an
/// optional extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceIdentifier {
    /// The assigning authority, usually an OID.
    pub root: String,
    /// The identifier within `root`.
    pub extension: Option<String>,
}

impl InstanceIdentifier {
    /// Creates an identifier with an extension.
    pub fn new(root: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: Some(extension.into()),
        }
    }

    /// Creates an identifier that is a bare root.
    pub fn root_only(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: None,
        }
    }

    /// Reads `root` and `extension` from an element. Returns `None` without a root.
    pub fn from_element(element: &XmlElement) -> Option<Self> {
        Some(Self {
            root: element.attr("root")?.to_string(),
            extension: element.attr("extension").map(str::to_string),
        })
    }

    /// Writes this identifier as an element named `name`.
    pub fn to_element(&self, name: &str) -> XmlElement {
        let element = XmlElement::new(name).with_attr("root", self.root.as_str());
        match &self.extension {
            Some(extension) => element.with_attr("extension", extension.as_str()),
            None => element,
        }
    }
}

/// A parsed PIX query.
///
/// The transmission wrapper parts needed to answer the query are kept as
/// prefix-free element trees so they can be echoed into the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixQuery {
    /// The request message id.
    pub message_id: Option<InstanceIdentifier>,
    /// The request processing code (`P`, `D` or `T`).
    pub processing_code: Option<String>,
    /// The request `sender`.
    pub sender: Option<XmlElement>,
    /// The request `receiver` elements.
    pub receivers: Vec<XmlElement>,
    /// The request `queryByParameter`, echoed in the response.
    pub query_by_parameter: XmlElement,
    /// The queried identifier; root and extension are both present.
    pub patient_identifier: InstanceIdentifier,
    /// Roots of the `dataSource` parameters, in request order without duplicates.
    pub data_sources: Vec<String>,
}

impl PixQuery {
    /// Parses a SOAP 1.2 envelope carrying a PRPA_IN201309UV02 message.
    pub fn from_soap(xml: &str) -> Result<Self> {
        let document = XmlElement::parse(xml)?;
        let payload = soap::body_payload(&document)?;
        Self::from_message(payload)
    }

    /// Reads a query from a PRPA_IN201309UV02 element.
    ///
    /// # Errors
    ///
    /// * `Hl7v3Error::InvalidQuery` - If the message is another interaction, or
    ///   does not carry exactly one patient identifier value with root and extension
    /// * `Hl7v3Error::Missing` - If a required element is absent
    pub fn from_message(message: &XmlElement) -> Result<Self> {
        if message.local_name() != QUERY_INTERACTION {
            return Err(Hl7v3Error::InvalidQuery(format!(
                "expected {}, found {}",
                QUERY_INTERACTION,
                message.local_name()
            )));
        }

        let control_act = message
            .child("controlActProcess")
            .ok_or_else(|| Hl7v3Error::Missing("controlActProcess".to_string()))?;
        let query_by_parameter = control_act
            .child("queryByParameter")
            .ok_or_else(|| Hl7v3Error::Missing("queryByParameter".to_string()))?;
        let parameter_list = query_by_parameter
            .child("parameterList")
            .ok_or_else(|| Hl7v3Error::Missing("parameterList".to_string()))?;

        let patient_identifier = single_patient_identifier(parameter_list)?;

        let mut data_sources: Vec<String> = Vec::new();
        for value in parameter_list.find_all("dataSource/value") {
            if let Some(root) = value.attr("root") {
                if !data_sources.iter().any(|existing| existing == root) {
                    data_sources.push(root.to_string());
                }
            }
        }

        Ok(Self {
            message_id: message.child("id").and_then(InstanceIdentifier::from_element),
            processing_code: message
                .child("processingCode")
                .and_then(|code| code.attr("code"))
                .map(str::to_string),
            sender: message.child("sender").map(XmlElement::without_prefixes),
            receivers: message
                .children_named("receiver")
                .map(XmlElement::without_prefixes)
                .collect(),
            query_by_parameter: query_by_parameter.without_prefixes(),
            patient_identifier,
            data_sources,
        })
    }

    /// Returns the domain of the queried identifier.
    pub fn query_domain(&self) -> &str {
        &self.patient_identifier.root
    }

    /// Returns the value of the queried identifier.
    pub fn query_value(&self) -> &str {
        self.patient_identifier.extension.as_deref().unwrap_or_default()
    }
}

fn single_patient_identifier(parameter_list: &XmlElement) -> Result<InstanceIdentifier> {
    let identifiers: Vec<&XmlElement> = parameter_list.children_named("patientIdentifier").collect();
    let [identifier] = identifiers.as_slice() else {
        return Err(Hl7v3Error::InvalidQuery(format!(
            "expected one patientIdentifier, found {}",
            identifiers.len()
        )));
    };

    let values: Vec<&XmlElement> = identifier.children_named("value").collect();
    let [value] = values.as_slice() else {
        return Err(Hl7v3Error::InvalidQuery(format!(
            "expected one patientIdentifier value, found {}",
            values.len()
        )));
    };

    match (value.attr("root"), value.attr("extension")) {
        (Some(root), Some(extension)) => Ok(InstanceIdentifier::new(root, extension)),
        _ => Err(Hl7v3Error::InvalidQuery(
            "patientIdentifier value needs both root and extension".to_string(),
        )),
    }
}

//! PIX query responses (PRPA_IN201310UV02).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::query::{InstanceIdentifier, PixQuery};
use crate::xml::XmlElement;
use crate::{HL7V3_NS, INTERACTION_ID_ROOT, RESPONSE_INTERACTION, RESPONSE_TRIGGER};

/// Acknowledgement detail code sent with an `AE` acknowledgement.
pub const UNKNOWN_KEY_IDENTIFIER: &str = "204 (Unknown Key Identifier)";

/// Application outcome of a PIX query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixOutcome {
    /// The identity was found; carries the identifiers to report.
    Ok(Vec<InstanceIdentifier>),
    /// The identity was found but holds nothing in the requested domains.
    NotFound,
    /// The queried identifier is unknown.
    Error,
}

impl PixOutcome {
    /// Returns the acknowledgement type code: `AA` or `AE`.
    pub fn ack_code(&self) -> &'static str {
        match self {
            PixOutcome::Ok(_) | PixOutcome::NotFound => "AA",
            PixOutcome::Error => "AE",
        }
    }

    /// Returns the query response code: `OK`, `NF` or `AE`.
    pub fn query_response_code(&self) -> &'static str {
        match self {
            PixOutcome::Ok(_) => "OK",
            PixOutcome::NotFound => "NF",
            PixOutcome::Error => "AE",
        }
    }

    fn identifiers(&self) -> &[InstanceIdentifier] {
        match self {
            PixOutcome::Ok(identifiers) => identifiers,
            PixOutcome::NotFound | PixOutcome::Error => &[],
        }
    }
}

/// Builds the PRPA_IN201310UV02 answer to a [`PixQuery`].
///
/// # Examples
///
/// ```
/// use patient_index_hl7v3::query::{InstanceIdentifier, PixQuery};
/// use patient_index_hl7v3::response::{PixOutcome, PixResponseBuilder};
/// use patient_index_hl7v3::xml::XmlElement;
///
/// let request = XmlElement::parse(
///     r#"<PRPA_IN201309UV02 xmlns="urn:hl7-org:v3"><controlActProcess><queryByParameter>
///          <parameterList><patientIdentifier><value root="1.1" extension="A"/></patientIdentifier></parameterList>
///        </queryByParameter></controlActProcess></PRPA_IN201309UV02>"#,
/// )
/// .unwrap();
/// let query = PixQuery::from_message(&request).unwrap();
///
/// let outcome = PixOutcome::Ok(vec![InstanceIdentifier::new("2.2", "B")]);
/// let response = PixResponseBuilder::new(&query).build(&outcome);
///
/// assert_eq!(response.find("acknowledgement/typeCode").unwrap().attr("code"), Some("AA"));
/// let ids = response.find_all("controlActProcess/subject/registrationEvent/subject1/patient/id");
/// assert_eq!(ids.len(), 1);
/// ```
#[derive(Debug)]
pub struct PixResponseBuilder<'a> {
    query: &'a PixQuery,
    message_id: String,
    creation_time: DateTime<Utc>,
}

impl<'a> PixResponseBuilder<'a> {
    /// Creates a builder with a fresh message id, timestamped now.
    pub fn new(query: &'a PixQuery) -> Self {
        Self {
            query,
            message_id: Uuid::new_v4().to_string(),
            creation_time: Utc::now(),
        }
    }

    /// Overrides the response message id.
    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = message_id.into();
        self
    }

    /// Overrides the creation time.
    pub fn with_creation_time(mut self, creation_time: DateTime<Utc>) -> Self {
        self.creation_time = creation_time;
        self
    }

    /// Builds the response message.
    pub fn build(&self, outcome: &PixOutcome) -> XmlElement {
        let mut response = XmlElement::new(RESPONSE_INTERACTION)
            .with_attr("xmlns", HL7V3_NS)
            .with_attr("ITSVersion", "XML_1.0")
            .with_child(InstanceIdentifier::root_only(self.message_id.as_str()).to_element("id"))
            .with_child(
                XmlElement::new("creationTime")
                    .with_attr("value", self.creation_time.format("%Y%m%d%H%M%S%z").to_string()),
            )
            .with_child(
                InstanceIdentifier::new(INTERACTION_ID_ROOT, RESPONSE_INTERACTION)
                    .to_element("interactionId"),
            );

        if let Some(code) = &self.query.processing_code {
            response.push_child(code_element("processingCode", code));
        }
        response.push_child(code_element("processingModeCode", "T"));
        response.push_child(code_element("acceptAckCode", "NE"));

        if let Some(sender) = &self.query.sender {
            response.push_child(transmission_party(sender, "receiver", "RCV"));
        }
        if let Some(receiver) = self.query.receivers.first() {
            response.push_child(transmission_party(receiver, "sender", "SND"));
        }

        response.push_child(self.acknowledgement(outcome));
        response.push_child(self.control_act_process(outcome));
        response
    }

    fn acknowledgement(&self, outcome: &PixOutcome) -> XmlElement {
        let mut acknowledgement = XmlElement::new("acknowledgement")
            .with_child(code_element("typeCode", outcome.ack_code()));

        let mut target_message = XmlElement::new("targetMessage");
        if let Some(id) = &self.query.message_id {
            target_message.push_child(id.to_element("id"));
        }
        acknowledgement.push_child(target_message);

        if matches!(outcome, PixOutcome::Error) {
            acknowledgement.push_child(
                XmlElement::new("acknowledgementDetail")
                    .with_attr("typeCode", "E")
                    .with_child(code_element("code", UNKNOWN_KEY_IDENTIFIER)),
            );
        }
        acknowledgement
    }

    fn control_act_process(&self, outcome: &PixOutcome) -> XmlElement {
        let mut subject = XmlElement::new("subject")
            .with_attr("typeCode", "SUBJ")
            .with_attr("contextConductionInd", "false");
        let identifiers = outcome.identifiers();
        if !identifiers.is_empty() {
            subject.push_child(registration_event(identifiers));
        }

        let mut query_ack = XmlElement::new("queryAck");
        if let Some(query_id) = self.query.query_by_parameter.child("queryId") {
            query_ack.push_child(query_id.clone());
        }
        query_ack.push_child(code_element("statusCode", "deliveredResponse"));
        query_ack.push_child(code_element("queryResponseCode", outcome.query_response_code()));

        XmlElement::new("controlActProcess")
            .with_attr("classCode", "CACT")
            .with_attr("moodCode", "EVN")
            .with_child(
                XmlElement::new("code")
                    .with_attr("code", RESPONSE_TRIGGER)
                    .with_attr("codeSystem", INTERACTION_ID_ROOT),
            )
            .with_child(subject)
            .with_child(query_ack)
            .with_child(self.query.query_by_parameter.clone())
    }
}

fn code_element(name: &str, code: &str) -> XmlElement {
    XmlElement::new(name).with_attr("code", code)
}

/// Re-addresses a request `sender` or `receiver` as the opposite party.
fn transmission_party(source: &XmlElement, name: &str, type_code: &str) -> XmlElement {
    let mut party = XmlElement::new(name).with_attr("typeCode", type_code);

    if let Some(device) = source.child("device") {
        let mut converted = XmlElement::new("device");
        for attribute in ["classCode", "determinerCode"] {
            if let Some(value) = device.attr(attribute) {
                converted.set_attr(attribute, value);
            }
        }
        converted = converted.with_children(device.children_named("id").cloned());
        party.push_child(converted);
    }
    party
}

fn registration_event(identifiers: &[InstanceIdentifier]) -> XmlElement {
    let patient = XmlElement::new("patient")
        .with_attr("classCode", "PAT")
        .with_children(identifiers.iter().map(|id| id.to_element("id")))
        .with_child(code_element("statusCode", "active"))
        .with_child(
            XmlElement::new("patientPerson")
                .with_attr("classCode", "PSN")
                .with_attr("determinerCode", "INSTANCE")
                .with_child(XmlElement::new("name").with_attr("nullFlavor", "NA")),
        );

    XmlElement::new("registrationEvent")
        .with_attr("classCode", "REG")
        .with_attr("moodCode", "EVN")
        .with_child(code_element("statusCode", "active"))
        .with_child(
            XmlElement::new("subject1")
                .with_attr("typeCode", "SBJ")
                .with_child(patient),
        )
        .with_child(
            XmlElement::new("custodian").with_attr("typeCode", "CST").with_child(
                XmlElement::new("assignedEntity")
                    .with_attr("classCode", "ASSIGNED")
                    .with_child(XmlElement::new("id").with_attr("nullFlavor", "NA")),
            ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn query() -> PixQuery {
        let message = XmlElement::parse(
            r#"<v3:PRPA_IN201309UV02 xmlns:v3="urn:hl7-org:v3">
                 <v3:id root="req-1"/>
                 <v3:processingCode code="P"/>
                 <v3:receiver typeCode="RCV">
                   <v3:device classCode="DEV" determinerCode="INSTANCE">
                     <v3:id root="9.9.1"/>
                     <v3:telecom value="https://example.org/pix"/>
                   </v3:device>
                 </v3:receiver>
                 <v3:sender typeCode="SND">
                   <v3:device classCode="DEV" determinerCode="INSTANCE"><v3:id root="9.9.2"/></v3:device>
                 </v3:sender>
                 <v3:controlActProcess classCode="CACT" moodCode="EVN">
                   <v3:queryByParameter>
                     <v3:queryId root="1.2.3" extension="q-1"/>
                     <v3:parameterList>
                       <v3:patientIdentifier><v3:value root="1.1" extension="A"/></v3:patientIdentifier>
                     </v3:parameterList>
                   </v3:queryByParameter>
                 </v3:controlActProcess>
               </v3:PRPA_IN201309UV02>"#,
        )
        .unwrap();
        PixQuery::from_message(&message).unwrap()
    }

    #[test]
    fn test_outcome_codes() {
        assert_eq!(PixOutcome::Ok(vec![]).ack_code(), "AA");
        assert_eq!(PixOutcome::Ok(vec![]).query_response_code(), "OK");
        assert_eq!(PixOutcome::NotFound.ack_code(), "AA");
        assert_eq!(PixOutcome::NotFound.query_response_code(), "NF");
        assert_eq!(PixOutcome::Error.ack_code(), "AE");
        assert_eq!(PixOutcome::Error.query_response_code(), "AE");
    }

    #[test]
    fn test_header() {
        let query = query();
        let time = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let response = PixResponseBuilder::new(&query)
            .with_message_id("resp-1")
            .with_creation_time(time)
            .build(&PixOutcome::NotFound);

        assert_eq!(response.name(), "PRPA_IN201310UV02");
        assert!(
            response
                .attributes()
                .contains(&("xmlns".to_string(), HL7V3_NS.to_string()))
        );
        assert_eq!(response.child("id").unwrap().attr("root"), Some("resp-1"));
        assert_eq!(
            response.child("creationTime").unwrap().attr("value"),
            Some("20240506070809+0000")
        );
        let interaction = response.child("interactionId").unwrap();
        assert_eq!(interaction.attr("root"), Some("2.16.840.1.113883.1.6"));
        assert_eq!(interaction.attr("extension"), Some("PRPA_IN201310UV02"));
        assert_eq!(response.find("processingCode").unwrap().attr("code"), Some("P"));
        assert_eq!(response.find("processingModeCode").unwrap().attr("code"), Some("T"));
        assert_eq!(response.find("acceptAckCode").unwrap().attr("code"), Some("NE"));
    }

    #[test]
    fn test_sender_and_receiver_are_swapped() {
        let query = query();
        let response = PixResponseBuilder::new(&query).build(&PixOutcome::NotFound);

        let receiver = response.child("receiver").unwrap();
        assert_eq!(receiver.attr("typeCode"), Some("RCV"));
        assert_eq!(receiver.find("device/id").unwrap().attr("root"), Some("9.9.2"));

        let sender = response.child("sender").unwrap();
        assert_eq!(sender.attr("typeCode"), Some("SND"));
        let device = sender.child("device").unwrap();
        assert_eq!(device.attr("classCode"), Some("DEV"));
        assert_eq!(device.attr("determinerCode"), Some("INSTANCE"));
        assert_eq!(device.find("id").unwrap().attr("root"), Some("9.9.1"));
        assert!(device.child("telecom").is_none());
    }

    #[test]
    fn test_ok_response_lists_identifiers() {
        let query = query();
        let outcome = PixOutcome::Ok(vec![
            InstanceIdentifier::new("1.1", "A"),
            InstanceIdentifier::new("2.2", "B"),
        ]);
        let response = PixResponseBuilder::new(&query).build(&outcome);

        let ack = response.child("acknowledgement").unwrap();
        assert_eq!(ack.find("typeCode").unwrap().attr("code"), Some("AA"));
        assert_eq!(ack.find("targetMessage/id").unwrap().attr("root"), Some("req-1"));
        assert!(ack.child("acknowledgementDetail").is_none());

        let event = response
            .find("controlActProcess/subject/registrationEvent")
            .unwrap();
        let ids = event.find_all("subject1/patient/id");
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1].attr("root"), Some("2.2"));
        assert_eq!(ids[1].attr("extension"), Some("B"));
        assert_eq!(
            event.find("custodian/assignedEntity").unwrap().attr("classCode"),
            Some("ASSIGNED")
        );

        let query_ack = response.find("controlActProcess/queryAck").unwrap();
        assert_eq!(query_ack.find("queryResponseCode").unwrap().attr("code"), Some("OK"));
        assert_eq!(query_ack.find("statusCode").unwrap().attr("code"), Some("deliveredResponse"));
        assert_eq!(query_ack.find("queryId").unwrap().attr("extension"), Some("q-1"));
    }

    #[test]
    fn test_not_found_response_has_no_registration_event() {
        let query = query();
        let response = PixResponseBuilder::new(&query).build(&PixOutcome::NotFound);

        assert!(response.find("controlActProcess/subject/registrationEvent").is_none());
        assert_eq!(
            response.find("controlActProcess/queryAck/queryResponseCode").unwrap().attr("code"),
            Some("NF")
        );
        assert_eq!(
            response.find("acknowledgement/typeCode").unwrap().attr("code"),
            Some("AA")
        );
    }

    #[test]
    fn test_error_response_carries_detail() {
        let query = query();
        let response = PixResponseBuilder::new(&query).build(&PixOutcome::Error);

        let ack = response.child("acknowledgement").unwrap();
        assert_eq!(ack.find("typeCode").unwrap().attr("code"), Some("AE"));
        let detail = ack.child("acknowledgementDetail").unwrap();
        assert_eq!(detail.attr("typeCode"), Some("E"));
        assert_eq!(detail.find("code").unwrap().attr("code"), Some(UNKNOWN_KEY_IDENTIFIER));

        assert!(response.find("controlActProcess/subject/registrationEvent").is_none());
        assert_eq!(
            response.find("controlActProcess/queryAck/queryResponseCode").unwrap().attr("code"),
            Some("AE")
        );
    }

    #[test]
    fn test_query_by_parameter_is_echoed() {
        let query = query();
        let response = PixResponseBuilder::new(&query).build(&PixOutcome::NotFound);

        let echoed = response.find("controlActProcess/queryByParameter").unwrap();
        assert_eq!(echoed, &query.query_by_parameter);
        assert_eq!(
            echoed.find("parameterList/patientIdentifier/value").unwrap().attr("extension"),
            Some("A")
        );
    }
}

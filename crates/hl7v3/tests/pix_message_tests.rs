//! End-to-end PIX message tests: SOAP request in, SOAP response out.

use patient_index_hl7v3::soap::body_payload;
use patient_index_hl7v3::{
    Hl7v3Error, InstanceIdentifier, PixOutcome, PixQuery, XmlElement, render_response,
    render_sender_fault,
};

/// The IHE ITI-45 sample query, with two data sources added.
const IHE_QUERY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope" xmlns:urn="urn:hl7-org:v3">
   <soap:Header />
   <soap:Body>
      <urn:PRPA_IN201309UV02 ITSVersion="XML_1.0">
         <urn:id root="2220c1c4-87ef-11dc-b865-3603d6866807" />
         <urn:creationTime value="20070810140900" />
         <urn:interactionId root="2.16.840.1.113883.1.6" extension="PRPA_IN201309UV02" />
         <urn:processingCode code="P" />
         <urn:processingModeCode code="T" />
         <urn:acceptAckCode code="AL" />
         <urn:receiver typeCode="RCV">
            <urn:device classCode="DEV" determinerCode="INSTANCE">
               <urn:id root="1.2.840.114350.1.13.99999.4567" />
               <urn:telecom value="https://example.org/PIXQuery"></urn:telecom>
            </urn:device>
         </urn:receiver>
         <urn:sender typeCode="SND">
            <urn:device classCode="DEV" determinerCode="INSTANCE">
               <urn:id root="1.2.840.114350.1.13.99997.2.7788" />
            </urn:device>
         </urn:sender>
         <urn:controlActProcess classCode="CACT" moodCode="EVN">
            <urn:code code="PRPA_TE201309UV02" codeSystem="2.16.840.1.113883.1.6" />
            <urn:authorOrPerformer typeCode="AUT">
               <urn:assignedPerson classCode="ASSIGNED">
                  <urn:id root="1.2.840.114350.1.13.99997.2.7766" extension="USR5568" />
               </urn:assignedPerson>
            </urn:authorOrPerformer>
            <urn:queryByParameter>
               <urn:queryId root="1.2.840.114350.1.13.99999.4567.34" extension="33452" />
               <urn:statusCode code="new" />
               <urn:responsePriorityCode code="I" />
               <urn:parameterList>
                  <urn:dataSource>
                     <urn:value root="2.16.840.1.113883.4.1" />
                     <urn:semanticsText>DataSource.id</urn:semanticsText>
                  </urn:dataSource>
                  <urn:dataSource>
                     <urn:value root="1.2.840.114350.1.13.99997.2.9999" />
                     <urn:semanticsText>DataSource.id</urn:semanticsText>
                  </urn:dataSource>
                  <urn:patientIdentifier>
                     <urn:value root="1.2.840.114350.1.13.99997.2.3412" extension="38273N237" />
                     <urn:semanticsText>Patient.Id</urn:semanticsText>
                  </urn:patientIdentifier>
               </urn:parameterList>
            </urn:queryByParameter>
         </urn:controlActProcess>
      </urn:PRPA_IN201309UV02>
   </soap:Body>
</soap:Envelope>"#;

fn response_payload(xml: &str) -> XmlElement {
    let envelope = XmlElement::parse(xml).expect("response is well-formed");
    body_payload(&envelope).expect("response is a SOAP envelope").clone()
}

// ============================================================================
// Request Parsing
// ============================================================================

#[test]
fn test_parse_ihe_sample() {
    let query = PixQuery::from_soap(IHE_QUERY).unwrap();

    assert_eq!(query.query_domain(), "1.2.840.114350.1.13.99997.2.3412");
    assert_eq!(query.query_value(), "38273N237");
    assert_eq!(
        query.data_sources,
        vec!["2.16.840.1.113883.4.1", "1.2.840.114350.1.13.99997.2.9999"]
    );
    assert_eq!(
        query.message_id,
        Some(InstanceIdentifier::root_only("2220c1c4-87ef-11dc-b865-3603d6866807"))
    );
    assert_eq!(query.receivers.len(), 1);
    assert!(query.sender.is_some());
}

#[test]
fn test_parse_rejects_non_soap_input() {
    assert!(matches!(
        PixQuery::from_soap("not xml at all <"),
        Err(Hl7v3Error::Xml(_)) | Err(Hl7v3Error::Malformed(_))
    ));
    assert!(matches!(
        PixQuery::from_soap(r#"<PRPA_IN201309UV02 xmlns="urn:hl7-org:v3"/>"#),
        Err(Hl7v3Error::NotSoapEnvelope(_))
    ));
}

// ============================================================================
// Response Rendering
// ============================================================================

#[test]
fn test_ok_response() {
    let query = PixQuery::from_soap(IHE_QUERY).unwrap();
    let outcome = PixOutcome::Ok(vec![InstanceIdentifier::new(
        "2.16.840.1.113883.4.1",
        "123-45-6789",
    )]);

    let payload = response_payload(&render_response(&query, &outcome).unwrap());

    assert_eq!(payload.local_name(), "PRPA_IN201310UV02");
    assert_eq!(
        payload.find("acknowledgement/typeCode").unwrap().attr("code"),
        Some("AA")
    );
    assert_eq!(
        payload
            .find("acknowledgement/targetMessage/id")
            .unwrap()
            .attr("root"),
        Some("2220c1c4-87ef-11dc-b865-3603d6866807")
    );
    assert_eq!(
        payload
            .find("controlActProcess/queryAck/queryResponseCode")
            .unwrap()
            .attr("code"),
        Some("OK")
    );

    let ids = payload.find_all("controlActProcess/subject/registrationEvent/subject1/patient/id");
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].attr("extension"), Some("123-45-6789"));

    assert_eq!(
        payload.find("receiver/device/id").unwrap().attr("root"),
        Some("1.2.840.114350.1.13.99997.2.7788")
    );
    assert_eq!(
        payload.find("sender/device/id").unwrap().attr("root"),
        Some("1.2.840.114350.1.13.99999.4567")
    );
}

#[test]
fn test_error_response() {
    let query = PixQuery::from_soap(IHE_QUERY).unwrap();

    let payload = response_payload(&render_response(&query, &PixOutcome::Error).unwrap());

    assert_eq!(
        payload.find("acknowledgement/typeCode").unwrap().attr("code"),
        Some("AE")
    );
    assert_eq!(
        payload
            .find("controlActProcess/queryAck/queryResponseCode")
            .unwrap()
            .attr("code"),
        Some("AE")
    );
    assert!(
        payload
            .find_all("controlActProcess/subject/registrationEvent/subject1/patient/id")
            .is_empty()
    );
}

#[test]
fn test_sender_fault() {
    let xml = render_sender_fault("expected one patientIdentifier, found 0").unwrap();
    let envelope = XmlElement::parse(&xml).unwrap();

    let fault = body_payload(&envelope).unwrap();
    assert_eq!(fault.local_name(), "Fault");
    assert_eq!(fault.find("Code/Value").unwrap().text(), "soap:Sender");
}

#[test]
fn test_deeply_nested_header_is_rejected() {
    let depth = 100_000;
    let header = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
    let envelope = IHE_QUERY.replace("<soap:Header />", &format!("<soap:Header>{}</soap:Header>", header));

    assert!(matches!(
        PixQuery::from_soap(&envelope),
        Err(Hl7v3Error::Malformed(_))
    ));
}

#[test]
fn test_echoed_query_keeps_xsi_type() {
    let typed = IHE_QUERY
        .replace(
            r#"xmlns:urn="urn:hl7-org:v3">"#,
            r#"xmlns:urn="urn:hl7-org:v3" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        )
        .replace(
            "<urn:queryByParameter>",
            r#"<urn:queryByParameter xsi:type="PRPA_MT201307UV02.QueryByParameter">"#,
        );
    let query = PixQuery::from_soap(&typed).unwrap();

    let payload = response_payload(&render_response(&query, &PixOutcome::NotFound).unwrap());

    let echoed = payload.find("controlActProcess/queryByParameter").unwrap();
    assert_eq!(echoed.attr("type"), Some("PRPA_MT201307UV02.QueryByParameter"));
    assert!(echoed.attributes().contains(&(
        "xmlns:xsi".to_string(),
        "http://www.w3.org/2001/XMLSchema-instance".to_string()
    )));
}

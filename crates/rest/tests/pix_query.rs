//! PIX query endpoint tests: SOAP requests against a live router.

mod common;

use axum::http::{StatusCode, header};
use patient_index_hl7v3::soap::{SOAP_CONTENT_TYPE, body_payload};
use patient_index_hl7v3::XmlElement;
use patient_index_persistence::core::AuditStorage;
use patient_index_persistence::types::AuditOperation;
use patient_index_rest::ServerConfig;

use common::*;

const PIX_PATH: &str = "/ws/pix";

/// Builds a PIX query for `domain`/`value`, restricted to `data_sources`.
fn pix_request(domain: &str, value: &str, data_sources: &[&str]) -> String {
    let data_sources: String = data_sources
        .iter()
        .map(|root| {
            format!(
                r#"<dataSource><value root="{}"/><semanticsText>DataSource.id</semanticsText></dataSource>"#,
                root
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope">
  <soap:Body>
    <PRPA_IN201309UV02 xmlns="urn:hl7-org:v3" ITSVersion="XML_1.0">
      <id root="5b7ae8ac-5a43-4e15-9b4c-0c5c1f2f9a11"/>
      <creationTime value="20240101120000"/>
      <interactionId root="2.16.840.1.113883.1.6" extension="PRPA_IN201309UV02"/>
      <processingCode code="P"/>
      <processingModeCode code="T"/>
      <acceptAckCode code="AL"/>
      <receiver typeCode="RCV"><device classCode="DEV" determinerCode="INSTANCE"><id root="1.2.3.4.5"/></device></receiver>
      <sender typeCode="SND"><device classCode="DEV" determinerCode="INSTANCE"><id root="5.4.3.2.1"/></device></sender>
      <controlActProcess classCode="CACT" moodCode="EVN">
        <code code="PRPA_TE201309UV02" codeSystem="2.16.840.1.113883.1.6"/>
        <queryByParameter>
          <queryId root="1.2.3" extension="q-1"/>
          <statusCode code="new"/>
          <responsePriorityCode code="I"/>
          <parameterList>
            {}
            <patientIdentifier>
              <value root="{}" extension="{}"/>
              <semanticsText>Patient.Id</semanticsText>
            </patientIdentifier>
          </parameterList>
        </queryByParameter>
      </controlActProcess>
    </PRPA_IN201309UV02>
  </soap:Body>
</soap:Envelope>"#,
        data_sources, domain, value
    )
}

/// Posts a SOAP body and returns the status and parsed response payload.
async fn post_pix(server: &axum_test::TestServer, body: String) -> (StatusCode, XmlElement) {
    let response = server
        .post(PIX_PATH)
        .text(body)
        .content_type(SOAP_CONTENT_TYPE)
        .await;

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/soap+xml"));

    let envelope = XmlElement::parse(&response.text()).expect("response is well-formed XML");
    let payload = body_payload(&envelope).expect("response is a SOAP envelope").clone();
    (response.status_code(), payload)
}

fn ack_code(payload: &XmlElement) -> Option<String> {
    payload
        .find("acknowledgement/typeCode")
        .and_then(|e| e.attr("code"))
        .map(str::to_string)
}

fn response_code(payload: &XmlElement) -> Option<String> {
    payload
        .find("controlActProcess/queryAck/queryResponseCode")
        .and_then(|e| e.attr("code"))
        .map(str::to_string)
}

fn reported_ids(payload: &XmlElement) -> Vec<(String, String)> {
    payload
        .find_all("controlActProcess/subject/registrationEvent/subject1/patient/id")
        .into_iter()
        .map(|id| {
            (
                id.attr("root").unwrap_or_default().to_string(),
                id.attr("extension").unwrap_or_default().to_string(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_resource_id_query_reports_requested_domain() {
    let (server, backend) = create_test_server();
    let patient = seed_patient(&backend, &[("urn:oid:1.1", "A"), ("urn:oid:2.2", "B")]).await;

    let (status, payload) = post_pix(&server, pix_request("0.0.0", patient.id(), &["1.1"])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload.local_name(), "PRPA_IN201310UV02");
    assert_eq!(ack_code(&payload).as_deref(), Some("AA"));
    assert_eq!(response_code(&payload).as_deref(), Some("OK"));
    assert_eq!(reported_ids(&payload), vec![("1.1".to_string(), "A".to_string())]);
}

#[tokio::test]
async fn test_identifier_query_without_data_sources_reports_all() {
    let (server, backend) = create_test_server();
    seed_patient(&backend, &[("urn:oid:1.1", "A"), ("urn:oid:2.2", "B")]).await;

    let (_, payload) = post_pix(&server, pix_request("1.1", "A", &[])).await;

    assert_eq!(response_code(&payload).as_deref(), Some("OK"));
    assert_eq!(reported_ids(&payload).len(), 2);
}

#[tokio::test]
async fn test_unheld_domain_is_not_found() {
    let (server, backend) = create_test_server();
    seed_patient(&backend, &[("urn:oid:1.1", "A")]).await;

    let (status, payload) = post_pix(&server, pix_request("1.1", "A", &["3.3"])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack_code(&payload).as_deref(), Some("AA"));
    assert_eq!(response_code(&payload).as_deref(), Some("NF"));
    assert!(reported_ids(&payload).is_empty());
}

#[tokio::test]
async fn test_unknown_identifier_is_application_error() {
    let (server, backend) = create_test_server();
    seed_patient(&backend, &[("urn:oid:1.1", "A")]).await;

    let (status, payload) = post_pix(&server, pix_request("1.1", "missing", &["1.1"])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack_code(&payload).as_deref(), Some("AE"));
    assert_eq!(response_code(&payload).as_deref(), Some("AE"));
    assert!(reported_ids(&payload).is_empty());
    let trail = backend.audit_trail(None).await.unwrap();
    assert!(trail.iter().all(|e| e.operation != AuditOperation::PixQuery));
}

#[tokio::test]
async fn test_rest_writes_are_visible_to_pix() {
    let (server, _backend) = create_test_server();

    let created: serde_json::Value = server
        .post("/Patient")
        .json(&patient_json(&[("urn:oid:1.1", "A"), ("urn:oid:2.2", "B")]))
        .await
        .json();
    let id = created["id"].as_str().unwrap().to_string();

    let (_, payload) = post_pix(&server, pix_request("2.2", "B", &["0.0.0"])).await;
    assert_eq!(response_code(&payload).as_deref(), Some("NF"));

    let (_, payload) = post_pix(&server, pix_request("0.0.0", &id, &["2.2"])).await;
    assert_eq!(reported_ids(&payload), vec![("2.2".to_string(), "B".to_string())]);
}

#[tokio::test]
async fn test_merged_patient_no_longer_resolves() {
    let (server, backend) = create_test_server();
    let source = seed_patient(&backend, &[("urn:oid:1.1", "A")]).await;
    let target = seed_patient(&backend, &[("urn:oid:2.2", "B")]).await;
    server
        .post("/Patient/$merge")
        .json(&merge_parameters(source.id(), target.id()))
        .await
        .assert_status_ok();

    let (_, payload) = post_pix(&server, pix_request("1.1", "A", &[])).await;

    assert_eq!(ack_code(&payload).as_deref(), Some("AE"));
}

#[tokio::test]
async fn test_response_echoes_request_addressing() {
    let (server, backend) = create_test_server();
    let patient = seed_patient(&backend, &[("urn:oid:1.1", "A")]).await;

    let (_, payload) = post_pix(&server, pix_request("0.0.0", patient.id(), &[])).await;

    assert_eq!(
        payload
            .find("acknowledgement/targetMessage/id")
            .and_then(|id| id.attr("root")),
        Some("5b7ae8ac-5a43-4e15-9b4c-0c5c1f2f9a11")
    );
    assert_eq!(
        payload.find("receiver/device/id").and_then(|id| id.attr("root")),
        Some("5.4.3.2.1")
    );
}

#[tokio::test]
async fn test_resolved_query_is_audited() {
    let (server, backend) = create_test_server();
    let patient = seed_patient(&backend, &[("urn:oid:1.1", "A"), ("urn:oid:2.2", "B")]).await;

    post_pix(&server, pix_request("1.1", "A", &["2.2"])).await;

    let trail = backend.audit_trail(Some(patient.id())).await.unwrap();
    let pix = trail
        .iter()
        .find(|e| e.operation == AuditOperation::PixQuery)
        .expect("PIX query audited");
    assert_eq!(pix.query.as_deref(), Some("1.1|A -> [2.2]"));
}

#[tokio::test]
async fn test_unusable_message_gets_sender_fault() {
    let (server, _backend) = create_test_server();

    for body in [
        "this is not xml <".to_string(),
        r#"<PRPA_IN201309UV02 xmlns="urn:hl7-org:v3"/>"#.to_string(),
        pix_request("1.1", "A", &[])
            .replace("<patientIdentifier>", "<ignored>")
            .replace("</patientIdentifier>", "</ignored>"),
    ] {
        let (status, payload) = post_pix(&server, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload.local_name(), "Fault");
        assert_eq!(payload.find("Code/Value").map(|v| v.text()), Some("soap:Sender"));
    }
}

#[tokio::test]
async fn test_deeply_nested_message_gets_sender_fault() {
    let (server, backend) = create_test_server();
    let patient = seed_patient(&backend, &[("urn:oid:1.1", "A")]).await;

    let depth = 10_000;
    let nested = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
    let body = pix_request("0.0.0", patient.id(), &[]).replace(
        "<soap:Body>",
        &format!("<soap:Header>{}</soap:Header><soap:Body>", nested),
    );

    let (status, payload) = post_pix(&server, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload.find("Code/Value").map(|v| v.text()), Some("soap:Sender"));

    let (status, payload) = post_pix(&server, pix_request("0.0.0", patient.id(), &[])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack_code(&payload).as_deref(), Some("AA"));
}

#[tokio::test]
async fn test_custom_domain_and_path() {
    let (server, backend) = create_test_server_with(ServerConfig {
        pid_domain: "9.9.9".to_string(),
        pix_path: "/pix".to_string(),
        ..ServerConfig::for_testing()
    });
    let patient = seed_patient(&backend, &[("urn:oid:1.1", "A")]).await;

    let response = server
        .post("/pix")
        .text(pix_request("urn:oid:9.9.9", patient.id(), &["1.1"]))
        .content_type(SOAP_CONTENT_TYPE)
        .await;

    response.assert_status_ok();
    assert!(response.text().contains(r#"extension="A""#));
}

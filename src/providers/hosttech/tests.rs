//! Integration tests for the Hosttech provider against a mocked SOAP endpoint

use super::*;
use crate::auth::credentials::StaticCredentialManager;
use crate::config::Config;
use crate::core::manager::{Action, DesiredRecord, RecordManager, RecordSelector};
use crate::core::record::DNSRecordType;
use crate::soap::Value;
use crate::soap::envelope::mock::{fault_xml, response_xml};
use assert_matches::assert_matches;
use httpmock::prelude::*;
use std::sync::Arc;

const PATH: &str = "/public/api";

fn provider(server: &MockServer) -> HosttechProvider {
    let config = Config {
        api_url: server.url(PATH),
        ..Config::default()
    };
    HosttechProvider::new(&config, Arc::new(StaticCredentialManager::new("user", "secret"))).unwrap()
}

fn www_record() -> Value {
    Value::Map(vec![
        ("id".into(), Value::Int(100)),
        ("zone".into(), Value::Int(42)),
        ("type".into(), "A".into()),
        ("prefix".into(), "www".into()),
        ("target".into(), "203.0.113.5".into()),
        ("ttl".into(), Value::Int(3600)),
        ("priority".into(), Value::Nil),
    ])
}

fn zone(records: Vec<Value>) -> Value {
    Value::Map(vec![
        ("id".into(), Value::Int(42)),
        ("name".into(), "example.ch".into()),
        ("ttl".into(), Value::Int(10800)),
        ("records".into(), Value::Array(records)),
    ])
}

#[tokio::test]
async fn test_ensure_record_creates_then_is_unchanged() {
    let server = MockServer::start_async().await;
    let api = server.url(PATH);
    let empty_zone = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH).body_contains("<ns1:getZone>");
            then.status(200)
                .body(response_xml(&api, "getZone", Some(true), &zone(vec![])));
        })
        .await;
    let add = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .body_contains("<ns1:addRecord>")
                .body_contains(r#"<search xsi:type="xsd:string">example.ch</search>"#)
                .body_contains(r#"<recorddata xsi:type="ns2:Map">"#)
                .body_contains(r#"<key xsi:type="xsd:string">type</key><value xsi:type="xsd:string">A</value>"#)
                .body_contains(r#"<key xsi:type="xsd:string">prefix</key><value xsi:type="xsd:string">www</value>"#)
                .body_contains(r#"<key xsi:type="xsd:string">target</key><value xsi:type="xsd:string">203.0.113.5</value>"#)
                .body_contains(r#"<key xsi:type="xsd:string">ttl</key><value xsi:type="xsd:int">3600</value>"#);
            then.status(200)
                .body(response_xml(&api, "addRecord", Some(true), &www_record()));
        })
        .await;

    let manager = RecordManager::new(Arc::new(provider(&server)));
    let desired = DesiredRecord::new("example.ch", "www", DNSRecordType::A)
        .with_value("203.0.113.5")
        .with_ttl(3600);

    assert_eq!(manager.ensure_record(&desired).await.unwrap(), Action::Created);
    empty_zone.assert_async().await;
    add.assert_async().await;

    empty_zone.delete_async().await;
    let populated = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH).body_contains("<ns1:getZone>");
            then.status(200).body(response_xml(
                &api,
                "getZone",
                Some(true),
                &zone(vec![www_record()]),
            ));
        })
        .await;

    assert_eq!(manager.ensure_record(&desired).await.unwrap(), Action::Unchanged);
    populated.assert_async().await;
    add.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_invalid_credentials_makes_no_mutation() {
    let server = MockServer::start_async().await;
    let get_zone = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH).body_contains("<ns1:getZone>");
            then.status(500)
                .body(fault_xml("INVALID_CREDENTIALS", "Invalid username or password"));
        })
        .await;
    let mutations = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH).body_contains("Record>");
            then.status(200);
        })
        .await;

    let manager = RecordManager::new(Arc::new(provider(&server)));
    let desired =
        DesiredRecord::new("example.ch", "www", DNSRecordType::A).with_value("203.0.113.5");

    let err = manager.ensure_record(&desired).await.unwrap_err();
    assert_matches!(err, Error::Authentication(msg) if msg == "Invalid username or password");
    get_zone.assert_async().await;
    mutations.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_missing_auth_acknowledgement() {
    let server = MockServer::start_async().await;
    let api = server.url(PATH);
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200)
                .body(response_xml(&api, "getNumberOfZones", Some(false), &Value::Int(1)));
        })
        .await;

    let err = provider(&server).get_number_of_zones().await.unwrap_err();
    assert_matches!(map_error(err), Error::Authentication(_));
}

#[tokio::test]
async fn test_unknown_zone() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH).body_contains("<ns1:getZone>");
            then.status(500)
                .body(fault_xml("SOAP-ENV:Server", "zone not found"));
        })
        .await;

    let provider = provider(&server);
    assert_eq!(provider.get_zone("example.org").await.unwrap(), None);
    assert_matches!(
        DNSProvider::list_records(&provider, "example.org").await,
        Err(Error::ZoneNotFound(zone)) if zone == "example.org"
    );
}

#[tokio::test]
async fn test_other_server_fault() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(500)
                .body(fault_xml("SOAP-ENV:Server", "database unavailable"));
        })
        .await;

    let err = provider(&server).get_zone("example.ch").await.unwrap_err();
    assert_matches!(
        map_error(err),
        Error::Fault { code, message } if code == "Server" && message == "database unavailable"
    );
}

#[tokio::test]
async fn test_remove_record_deletes_by_id() {
    let server = MockServer::start_async().await;
    let api = server.url(PATH);
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH).body_contains("<ns1:getZone>");
            then.status(200).body(response_xml(
                &api,
                "getZone",
                Some(true),
                &zone(vec![www_record()]),
            ));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .body_contains("<ns1:deleteRecord>")
                .body_contains(r#"<recordId xsi:type="xsd:string">100</recordId>"#);
            then.status(200)
                .body(response_xml(&api, "deleteRecord", Some(true), &Value::Bool(true)));
        })
        .await;

    let manager = RecordManager::new(Arc::new(provider(&server)));
    let selector = RecordSelector::new("example.ch", "www.example.ch", DNSRecordType::A)
        .with_value("203.0.113.5");
    assert_eq!(manager.remove_record(&selector).await.unwrap(), Action::Deleted);
    delete.assert_async().await;
}

#[tokio::test]
async fn test_update_record_sends_id_and_data() {
    let server = MockServer::start_async().await;
    let api = server.url(PATH);
    let update = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .body_contains("<ns1:updateRecord>")
                .body_contains(r#"<recordId xsi:type="xsd:string">100</recordId>"#)
                .body_contains(r#"<key xsi:type="xsd:string">ttl</key><value xsi:type="xsd:int">300</value>"#);
            then.status(200)
                .body(response_xml(&api, "updateRecord", Some(true), &www_record()));
        })
        .await;

    let record = DNSRecord::new(DNSRecordType::A, Some("www"), "203.0.113.5")
        .with_id(100)
        .with_ttl(300);
    let updated = provider(&server).update_record(&record).await.unwrap();
    update.assert_async().await;
    assert_eq!(updated.id, Some(100));
}

#[tokio::test]
async fn test_update_without_id_sends_nothing() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200);
        })
        .await;

    let record = DNSRecord::new(DNSRecordType::A, Some("www"), "203.0.113.5");
    let err = provider(&server).update_record(&record).await.unwrap_err();
    assert_matches!(err, HosttechProviderError::InvalidInput(_));
    any.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_get_record_by_id() {
    let server = MockServer::start_async().await;
    let api = server.url(PATH);
    let get = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .body_contains(r#"<recordId xsi:type="xsd:int">100</recordId>"#);
            then.status(200)
                .body(response_xml(&api, "getRecord", Some(true), &www_record()));
        })
        .await;

    let record = provider(&server).get_record(100).await.unwrap();
    get.assert_async().await;
    assert_eq!(record.name.as_deref(), Some("www"));
}

#[tokio::test]
async fn test_change_ip_and_ttl() {
    let server = MockServer::start_async().await;
    let api = server.url(PATH);
    let change_ip = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .header("SOAPAction", format!("\"{api}#changeIp\""))
                .body_contains(r#"<currentIp xsi:type="xsd:string">192.0.2.1</currentIp>"#)
                .body_contains(r#"<newIp xsi:type="xsd:string">192.0.2.2</newIp>"#);
            then.status(200)
                .body(response_xml(&api, "changeIp", Some(true), &Value::Int(3)));
        })
        .await;
    let change_ttl = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .body_contains("<ns1:changeTTL>")
                .body_contains(r#"<ttl xsi:type="xsd:string">600</ttl>"#);
            then.status(200)
                .body(response_xml(&api, "changeTTL", Some(true), &Value::Int(2)));
        })
        .await;

    let provider = provider(&server);
    assert_eq!(provider.change_ip("192.0.2.1", "192.0.2.2").await.unwrap(), 3);
    assert_eq!(provider.change_ttl("192.0.2.2", 600).await.unwrap(), 2);
    change_ip.assert_async().await;
    change_ttl.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    let config = Config {
        api_url: "http://127.0.0.1:9/public/api".into(),
        ..Config::default()
    };
    let provider =
        HosttechProvider::new(&config, Arc::new(StaticCredentialManager::new("u", "p"))).unwrap();
    let err = DNSProvider::list_records(&provider, "example.ch")
        .await
        .unwrap_err();
    assert_matches!(err, Error::Transport(_));
}

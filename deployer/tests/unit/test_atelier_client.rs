//! Atelier client tests against a mock server

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use iris_deployer::app::options::DeploymentRequest;
use iris_deployer::app::run::run;
use iris_deployer::deploy::doc_id::RemoteDocumentId;
use iris_deployer::deploy::outcome::{Operation, Severity, StatusClass};
use iris_deployer::deploy::report::exit_status;
use iris_deployer::http::client::AtelierClient;
use iris_deployer::http::transport::{DocumentPayload, DocumentSnapshot, DocumentTransport};

use crate::support::{request, source_root, write_source, RecordingObserver};

const DOC_PATH: &str = "/api/atelier/v2/USER/doc/A.cls";
const AUTHORIZATION: &str = "Basic Y2k6c2VjcmV0";

fn request_for(server: &MockServer, source_path: &str) -> DeploymentRequest {
    let url = Url::parse(&server.uri()).unwrap();
    request(
        url.host_str().unwrap(),
        url.port().unwrap(),
        source_path,
    )
}

fn client_for(server: &MockServer) -> AtelierClient {
    AtelierClient::new(&request_for(server, "src/")).unwrap()
}

fn payload() -> DocumentPayload {
    DocumentPayload::from_text("A.cls".into(), "class A {}\n")
}

#[tokio::test]
async fn test_namespace_url_points_at_server() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    assert_eq!(
        client.namespace_url().as_str(),
        format!("{}/api/atelier/v2/USER/", server.uri())
    );
}

#[tokio::test]
async fn test_fetch_existing_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .and(header("authorization", AUTHORIZATION))
        .and(header("accept", "*/*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"errors": [], "summary": ""},
            "console": [],
            "result": {"name": "A.cls", "ts": "2024-05-02 10:11:12.000", "content": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client_for(&server).fetch(&"A.cls".into()).await.unwrap();

    assert_eq!(
        snapshot,
        DocumentSnapshot::Present {
            version: "2024-05-02 10:11:12.000".to_string()
        }
    );
    server.verify().await;
}

#[tokio::test]
async fn test_fetch_missing_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": {"errors": [], "summary": "ERROR #16005: Document 'A.cls' does not exist"},
            "console": [],
            "result": {}
        })))
        .mount(&server)
        .await;

    let snapshot = client_for(&server).fetch(&"A.cls".into()).await.unwrap();

    assert_eq!(snapshot, DocumentSnapshot::Absent);
}

#[tokio::test]
async fn test_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .fetch(&"A.cls".into())
        .await
        .unwrap_err();

    assert_eq!(outcome.class, StatusClass::ServerError);
    assert_eq!(outcome.http_status, Some(401));
    assert_eq!(outcome.severity(Operation::Fetch), Severity::Error);
}

#[tokio::test]
async fn test_fetch_unreadable_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Login</html>"))
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .fetch(&"A.cls".into())
        .await
        .unwrap_err();

    assert_eq!(outcome.class, StatusClass::ServerError);
    assert_eq!(outcome.http_status, Some(200));
    assert_eq!(outcome.severity(Operation::Fetch), Severity::Error);
}

#[tokio::test]
async fn test_upsert_sends_precondition_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(DOC_PATH))
        .and(header("if-none-match", "t1"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", AUTHORIZATION))
        .and(body_json(json!({"enc": false, "content": ["class A {}"]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": {"errors": [], "summary": ""},
            "console": [],
            "result": {"name": "A.cls", "ts": "t2"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).upsert(&payload(), Some("t1")).await;

    assert_eq!(outcome.class, StatusClass::Created);
    assert_eq!(outcome.severity(Operation::Upsert), Severity::Success);
    server.verify().await;
}

#[tokio::test]
async fn test_upsert_without_precondition() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {}})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.upsert(&payload(), None).await;
    client.upsert(&payload(), Some("")).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in requests {
        assert!(request.headers.get("if-none-match").is_none());
    }
}

#[tokio::test]
async fn test_upsert_conflict_keeps_console() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "status": {"errors": [], "summary": ""},
            "console": ["Document A.cls has been changed on the server"],
            "result": {"status": "Conflict"}
        })))
        .mount(&server)
        .await;

    let outcome = client_for(&server).upsert(&payload(), Some("t1")).await;

    assert_eq!(outcome.class, StatusClass::Conflict);
    assert_eq!(outcome.severity(Operation::Upsert), Severity::Warning);
    assert!(outcome.diagnostic().contains("changed on the server"));
}

#[tokio::test]
async fn test_compile_reports_summary_as_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/atelier/v2/USER/action/compile"))
        .and(query_param("source", "0"))
        .and(query_param("flags", "cukb"))
        .and(body_json(json!(["A.cls"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"errors": [], "summary": "E123: error"},
            "console": ["Compiling class A", "ERROR #5030"],
            "result": {"content": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ids = vec![RemoteDocumentId::from("A.cls")];
    // Blank flags fall back to the default
    let outcome = client_for(&server).batch_compile(&ids, " ").await;

    assert_eq!(outcome.summary.as_deref(), Some("E123: error"));
    assert_eq!(outcome.console.len(), 2);
    assert_eq!(outcome.severity(Operation::Compile), Severity::Error);
    server.verify().await;
}

#[tokio::test]
async fn test_compile_success_with_null_summary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/atelier/v2/USER/action/compile"))
        .and(query_param("flags", "ck"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"errors": [], "summary": null},
            "console": ["Compilation finished successfully"],
            "result": {"content": []}
        })))
        .mount(&server)
        .await;

    let ids = vec![RemoteDocumentId::from("A.cls")];
    let outcome = client_for(&server).batch_compile(&ids, "ck").await;

    assert_eq!(outcome.summary, None);
    assert_eq!(outcome.severity(Operation::Compile), Severity::Success);
}

#[tokio::test]
async fn test_delete_sends_one_batch() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/atelier/v2/USER/docs"))
        .and(body_json(json!(["B.cls", "C.cls"])))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let ids = vec![RemoteDocumentId::from("B.cls"), RemoteDocumentId::from("C.cls")];
    let outcome = client_for(&server).batch_delete(&ids).await;

    assert_eq!(outcome.http_status, Some(500));
    assert_eq!(outcome.summary.as_deref(), Some("Internal Server Error"));
    assert_eq!(outcome.severity(Operation::Delete), Severity::Error);
    server.verify().await;
}

#[tokio::test]
async fn test_delete_success() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/atelier/v2/USER/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"errors": [], "summary": ""},
            "console": [],
            "result": [
                {"name": "B.cls", "db": "USER", "status": ""},
                {"name": "C.cls", "db": "USER", "status": ""}
            ]
        })))
        .mount(&server)
        .await;

    let ids = vec![RemoteDocumentId::from("B.cls"), RemoteDocumentId::from("C.cls")];
    let outcome = client_for(&server).batch_delete(&ids).await;

    assert_eq!(outcome.severity(Operation::Delete), Severity::Success);
}

#[tokio::test]
async fn test_unreachable_server_is_an_error() {
    // Bind then release a port so nothing listens on it
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = AtelierClient::new(&request("127.0.0.1", port, "src/")).unwrap();

    let outcome = client.upsert(&payload(), None).await;

    assert_eq!(outcome.class, StatusClass::ServerError);
    assert_eq!(outcome.http_status, None);
    assert_eq!(outcome.severity(Operation::Upsert), Severity::Error);
}

#[tokio::test]
async fn test_run_deploys_new_document() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = write_source(dir.path(), "A.cls", "class A {}\n");

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"result": {}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(DOC_PATH))
        .and(body_json(json!({"enc": false, "content": ["class A {}"]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"result": {}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/atelier/v2/USER/action/compile"))
        .and(query_param("flags", "cukb"))
        .and(body_json(json!(["A.cls"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"errors": [], "summary": null},
            "console": [],
            "result": {"content": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = request_for(&server, &source_root(dir.path()));
    request.changed_files = vec![path_a];
    let observer = RecordingObserver::default();

    let result = run(&request, &observer).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[1].headers.get("if-none-match").is_none());
    assert_eq!(exit_status(&result), 0);
    server.verify().await;
}

async fn slow_compile(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/atelier/v2/USER/action/compile"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "status": {"errors": [], "summary": null},
                    "console": [],
                    "result": {"content": []}
                }))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_slow_compile_without_timeout() {
    let server = MockServer::start().await;
    slow_compile(&server).await;

    let ids = vec![RemoteDocumentId::from("A.cls")];
    let outcome = client_for(&server).batch_compile(&ids, "cukb").await;

    assert_eq!(outcome.http_status, Some(200));
    assert_eq!(outcome.severity(Operation::Compile), Severity::Success);
}

#[tokio::test]
async fn test_zero_timeout_means_none() {
    let server = MockServer::start().await;
    slow_compile(&server).await;

    let mut request = request_for(&server, "src/");
    request.timeout_secs = Some(0);
    let client = AtelierClient::new(&request).unwrap();

    let ids = vec![RemoteDocumentId::from("A.cls")];
    let outcome = client.batch_compile(&ids, "cukb").await;

    assert_eq!(outcome.severity(Operation::Compile), Severity::Success);
}

#[tokio::test]
async fn test_timeout_reports_its_cause() {
    let server = MockServer::start().await;
    slow_compile(&server).await;

    let mut request = request_for(&server, "src/");
    request.timeout_secs = Some(1);
    let client = AtelierClient::new(&request).unwrap();

    let ids = vec![RemoteDocumentId::from("A.cls")];
    let outcome = client.batch_compile(&ids, "cukb").await;

    assert_eq!(outcome.http_status, None);
    assert_eq!(outcome.severity(Operation::Compile), Severity::Error);
    assert!(outcome.diagnostic().contains("timed out"));
}

//! The reporting sink client against a mock allure-docker-service.

use std::time::Duration;

use serde_json::{json, Value};
use vcts_core::Outcome;
use vcts_report::{allure, AllureSink, Attachment, ReportBuilder, ReportMeta, SinkError};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn sample_files() -> Vec<vcts_report::AllureFile> {
    let mut b = ReportBuilder::new(ReportMeta::new("vc-data-model"));
    b.open_parent_suite("Verifiable Credentials Data Model v2.0").unwrap();
    b.open_suite("Basic Concepts").unwrap();
    b.open_sub_suite("Types").unwrap();
    b.record_test(
        "type is present",
        Outcome::Passed,
        vec![],
        vec![Attachment::json("Document", json!({"type": "VerifiableCredential"}))],
    )
    .unwrap();
    b.close_sub_suite().unwrap();
    b.close_suite().unwrap();
    b.close_parent_suite().unwrap();
    allure::export(&b.finish().unwrap())
}

fn sink(server: &MockServer) -> AllureSink {
    AllureSink::new(&server.uri(), Duration::from_secs(5)).expect("sink")
}

#[tokio::test]
async fn publish_sends_results_then_generates_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/allure-docker-service/send-results"))
        .and(query_param("project_id", "vc-data-model"))
        .and(query_param("force_project_creation", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta_data": {}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/allure-docker-service/generate-report"))
        .and(query_param("project_id", "vc-data-model"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let files = sample_files();
    sink(&server)
        .publish("vc-data-model", &files)
        .await
        .expect("publish");

    let requests: Vec<Request> = server.received_requests().await.expect("recording");
    let body: Value = serde_json::from_slice(&requests[0].body).expect("json body");
    let results = body["results"].as_array().expect("results");
    assert_eq!(results.len(), files.len());
    assert!(results
        .iter()
        .all(|r| r["file_name"].is_string() && r["content_base64"].is_string()));
}

#[tokio::test]
async fn entries_carry_file_names() {
    let server = MockServer::start().await;
    let files = sample_files();
    Mock::given(method("POST"))
        .and(path("/allure-docker-service/send-results"))
        .and(body_partial_json(json!({"results": [{"file_name": files[0].file_name}]})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    sink(&server)
        .send_results("p", &files[..1])
        .await
        .expect("send");
}

#[tokio::test]
async fn rejected_upload_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/allure-docker-service/send-results"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad project"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = sink(&server)
        .publish("p", &sample_files())
        .await
        .unwrap_err();
    match err {
        SinkError::Status { status, body, .. } => {
            assert_eq!(status, 400);
            assert_eq!(body, "bad project");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_sink_is_an_http_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);
    let sink = AllureSink::new(&uri, Duration::from_secs(2)).expect("sink");
    assert!(matches!(
        sink.generate_report("p").await,
        Err(SinkError::Http { .. })
    ));
}

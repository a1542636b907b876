//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use vcts_api::{app, AppState};
use vcts_suite::Settings;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(vars: &[(&str, &str)]) -> Settings {
    let vars: Vec<(String, String)> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::from_lookup(|name| {
        vars.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    })
    .unwrap()
}

fn offline_app() -> Router {
    app(AppState::new(settings(&[("VCTS_OFFLINE", "true")])).unwrap())
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn credential() -> Value {
    json!({
        "@context": ["https://www.w3.org/ns/credentials/v2"],
        "type": ["VerifiableCredential"],
        "issuer": "https://example.org/issuers/14",
        "validFrom": "2024-01-01T00:00:00Z",
        "credentialSubject": {"id": "https://example.org/subjects/1"}
    })
}

#[tokio::test]
async fn server_status_is_ok() {
    let response = offline_app()
        .oneshot(
            Request::builder()
                .uri("/server/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn evaluation_returns_summary_by_sub_suite() {
    let response = offline_app()
        .oneshot(post_json("/w3c/vc-data-model", &credential().to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body.get("semantics").is_none());

    let summary = body["vc_data_model"].as_object().unwrap();
    assert_eq!(summary.len(), 24);
    assert_eq!(summary.keys().next().map(String::as_str), Some("Contexts"));
    let types = summary["Types"].as_array().unwrap();
    assert_eq!(types.len(), 3);
    for entry in types {
        assert_eq!(entry["outcome"], "passed");
        assert!(entry["statement"].is_string());
    }
    assert_eq!(summary["Trust Model"], json!([]));
}

#[tokio::test]
async fn semantics_query_runs_analysis() {
    let response = offline_app()
        .oneshot(post_json(
            "/w3c/vc-data-model?project=demo&semantics=true",
            &credential().to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["semantics"]["outcome"], "passed");
    assert_eq!(body["semantics"]["steps"].as_array().unwrap().len(), 2);

    let contexts = body["vc_data_model"]["Contexts"].as_array().unwrap();
    assert_eq!(contexts.len(), 5);
    assert_eq!(contexts[4]["outcome"], "passed");
}

#[tokio::test]
async fn contexts_on_private_hosts_are_never_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ctx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"@context": {}})))
        .expect(0)
        .mount(&server)
        .await;

    let state = AppState::new(settings(&[("VCTS_ALLOW_PRIVATE_HOSTS", "true")])).unwrap();
    assert!(!state.semantics.resolver().config().allow_private_hosts);

    let mut credential = credential();
    credential["@context"] = json!([
        "https://www.w3.org/ns/credentials/v2",
        format!("{}/ctx", server.uri())
    ]);
    let response = app(state)
        .oneshot(post_json(
            "/w3c/vc-data-model?semantics=true",
            &credential.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["semantics"]["outcome"], "failed");
}

#[tokio::test]
async fn semantics_are_skipped_by_default() {
    let response = offline_app()
        .oneshot(post_json("/w3c/vc-data-model", &credential().to_string()))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["vc_data_model"]["Contexts"][4]["outcome"], "skipped");
}

#[tokio::test]
async fn non_object_body_is_bad_request() {
    for body in ["[1, 2, 3]", "\"credential\"", "{not json"] {
        let response = offline_app()
            .oneshot(post_json("/w3c/vc-data-model", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let err = json_body(response).await;
        assert_eq!(err["error"]["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn openapi_document_uses_configured_title() {
    let state = AppState::new(settings(&[
        ("VCTS_OFFLINE", "true"),
        ("VCTS_PROJECT_TITLE", "Conformance"),
        ("VCTS_PROJECT_VERSION", "v7"),
    ]))
    .unwrap();
    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert_eq!(doc["info"]["title"], "Conformance");
    assert_eq!(doc["info"]["version"], "v7");
    assert!(doc["paths"]["/w3c/vc-data-model"]["post"].is_object());
}

#[tokio::test]
async fn reports_are_published_in_the_background() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/allure-docker-service/send-results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/allure-docker-service/generate-report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let state = AppState::new(settings(&[("VCTS_OFFLINE", "true"), ("ALLURE_API", &uri)])).unwrap();
    let response = app(state)
        .oneshot(post_json("/w3c/vc-data-model?project=demo", &credential().to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for _ in 0..50 {
        let seen = server.received_requests().await.map_or(0, |r| r.len());
        if seen >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

#[tokio::test]
async fn unreachable_sink_does_not_fail_the_request() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let state = AppState::new(settings(&[("ALLURE_API", &uri), ("VCTS_OFFLINE", "true")])).unwrap();
    let response = app(state)
        .oneshot(post_json("/w3c/vc-data-model", &credential().to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

//! Context resolution against a mock context host.

use std::time::{Duration, Instant};

use serde_json::json;
use vcts_jsonld::{
    ContextResolver, ResolutionError, ResolverConfig, SemanticError, SemanticProcessor, MAX_REMOTE_CONTEXTS,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> ResolverConfig {
    ResolverConfig {
        timeout: Duration::from_secs(5),
        deadline: Duration::from_secs(10),
        offline: false,
        preload_bundled: false,
        allow_private_hosts: true,
    }
}

fn resolver() -> ContextResolver {
    ContextResolver::new(config())
}

#[tokio::test]
async fn fetches_once_and_serves_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ctx"))
        .and(header("accept", "application/ld+json, application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@context": {"name": "https://schema.org/name"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver();
    let url = format!("{}/ctx", server.uri());
    let first = resolver.resolve(&url).await.unwrap();
    let second = resolver.resolve(&url).await.unwrap();
    assert_eq!(first, second);
    assert!(resolver.cache().contains(&url));
}

#[tokio::test]
async fn error_status_is_reported_with_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let err = resolver().resolve(&url).await.unwrap_err();
    assert!(matches!(err, ResolutionError::Status { status: 404, .. }));
    assert_eq!(err.url(), url);
}

#[tokio::test]
async fn non_json_body_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let err = resolver()
        .resolve(&format!("{}/html", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolutionError::InvalidBody { .. }));
}

#[tokio::test]
async fn slow_hosts_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"@context": {}}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let resolver = ContextResolver::new(ResolverConfig {
        timeout: Duration::from_millis(200),
        ..config()
    });
    let err = resolver
        .resolve(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolutionError::Timeout { .. }));
}

#[tokio::test]
async fn resolve_all_follows_nested_references() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/outer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@context": [
                "inner",
                {"Thing": {"@id": "https://example.org/Thing", "@context": format!("{base}/scoped")}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/inner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@context": {"name": "https://schema.org/name"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scoped"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@context": {"size": "https://example.org/size"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let doc = json!({"@context": [format!("{base}/outer"), format!("{base}/outer")]});
    let resolved = resolver().resolve_all(&doc).await.unwrap();
    assert_eq!(resolved.len(), 3);
    assert!(resolved.urls().contains(&format!("{base}/inner").as_str()));
}

#[tokio::test]
async fn semantic_processor_uses_fetched_contexts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ctx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@context": {"id": "@id", "name": "https://schema.org/name"}
        })))
        .mount(&server)
        .await;

    let processor = SemanticProcessor::new(resolver());
    let doc = json!({
        "@context": format!("{}/ctx", server.uri()),
        "id": "https://example.org/a",
        "name": "A",
        "unknown": 1
    });
    let undefined = processor.find_undefined_properties(&doc).await.unwrap();
    assert_eq!(undefined, ["unknown"]);
}

#[tokio::test]
async fn relative_context_reference_is_an_invalid_url() {
    let processor = SemanticProcessor::new(resolver());
    let err = processor
        .validate_context(&json!({"@context": "context.jsonld"}))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SemanticError::Resolution(ResolutionError::InvalidUrl { .. })
    ));
    assert_eq!(err.to_error_object()["type"], "jsonld.InvalidUrl");
}

#[tokio::test]
async fn many_slow_contexts_share_one_deadline() {
    let server = MockServer::start().await;
    for i in 0..MAX_REMOTE_CONTEXTS {
        Mock::given(method("GET"))
            .and(path(format!("/slow/{i}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"@context": {}}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;
    }

    let resolver = ContextResolver::new(ResolverConfig {
        timeout: Duration::from_secs(2),
        deadline: Duration::from_millis(1200),
        ..config()
    });
    let contexts: Vec<String> = (0..MAX_REMOTE_CONTEXTS)
        .map(|i| format!("{}/slow/{i}", server.uri()))
        .collect();
    let started = Instant::now();
    let err = resolver
        .resolve_all(&json!({"@context": contexts}))
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ResolutionError::Timeout { .. }), "{err}");
    assert!(elapsed < Duration::from_millis(2500), "took {elapsed:?}");
}

#[tokio::test]
async fn documents_over_the_context_limit_fetch_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"@context": {}})))
        .expect(0)
        .mount(&server)
        .await;

    let contexts: Vec<String> = (0..=MAX_REMOTE_CONTEXTS)
        .map(|i| format!("{}/ctx/{i}", server.uri()))
        .collect();
    let err = resolver()
        .resolve_all(&json!({"@context": contexts}))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolutionError::TooManyContexts { .. }), "{err}");
}

#[tokio::test]
async fn nested_references_count_towards_the_limit() {
    let server = MockServer::start().await;
    let base = server.uri();
    let nested: Vec<String> = (0..MAX_REMOTE_CONTEXTS)
        .map(|i| format!("{base}/leaf/{i}"))
        .collect();
    Mock::given(method("GET"))
        .and(path("/root"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"@context": nested})))
        .expect(1)
        .mount(&server)
        .await;

    let err = resolver()
        .resolve_all(&json!({"@context": format!("{base}/root")}))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResolutionError::TooManyContexts { limit: MAX_REMOTE_CONTEXTS, .. }
    ));
}

#[tokio::test]
async fn loopback_hosts_are_refused_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"@context": {}})))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = ContextResolver::new(ResolverConfig {
        allow_private_hosts: false,
        ..config()
    });
    let err = resolver
        .resolve(&format!("{}/ctx", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolutionError::PrivateHost { .. }));
}

//! Contract tests for DocumentFetcher against a mocked application.
//!
//! | Scenario | Test |
//! |----------|------|
//! | relative document URLs joined onto the derived base URL | `fetches_documents_relative_to_webhook_base` |
//! | partial failure with parallelism below document count | `partial_failures_are_aggregated_once_each` |
//! | zero parallelism clamped to one | `zero_parallelism_still_fetches_sequentially` |
//! | tenant handling for template webhooks | `template_webhook_*` |
//! | fatal well-known problems | `well_known_*` |
//! | unsupported strategies, size cap, perspective, proxy, credentials | remaining tests |

use ord_client::{
    ClientConfig, DocumentFetcher, FetchError, RequestContext, Resource, ResourceType, Webhook,
    WebhookAuth, WebhookOwner, MAX_DOCUMENT_BYTES, WELL_KNOWN_SUFFIX,
};
use ord_core::Perspective;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(max_parallel_documents: usize) -> DocumentFetcher {
    DocumentFetcher::new(ClientConfig {
        max_parallel_documents,
        timeout_secs: 5,
        ..ClientConfig::default()
    })
    .unwrap()
}

fn webhook_for(server: &MockServer) -> Webhook {
    Webhook::open(format!("{}{WELL_KNOWN_SUFFIX}", server.uri()))
}

fn app() -> Resource {
    Resource::application("app-1", "test-app")
}

fn descriptor(url: &str) -> Value {
    json!({"url": url, "accessStrategies": [{"type": "open"}]})
}

fn minimal_document() -> Value {
    json!({"openResourceDiscovery": "1.9", "packages": [{"ordId": "ns:package:P:v1"}]})
}

async fn mount_well_known(server: &MockServer, config: Value) {
    Mock::given(method("GET"))
        .and(path(WELL_KNOWN_SUFFIX))
        .respond_with(ResponseTemplate::new(200).set_body_json(config))
        .mount(server)
        .await;
}

async fn mount_document(server: &MockServer, at: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(status).set_body_json(minimal_document()))
        .mount(server)
        .await;
}

// -- Happy path ---------------------------------------------------------------

#[tokio::test]
async fn fetches_documents_relative_to_webhook_base() {
    let server = MockServer::start().await;
    mount_well_known(
        &server,
        json!({"openResourceDiscoveryV1": {"documents": [descriptor("/ord/a"), descriptor("/ord/b")]}}),
    )
    .await;
    mount_document(&server, "/ord/a", 200).await;
    mount_document(&server, "/ord/b", 200).await;

    let fetched = fetcher(4)
        .fetch_documents(&RequestContext::default(), &app(), &webhook_for(&server))
        .await
        .unwrap();

    assert_eq!(fetched.base_url, server.uri());
    assert_eq!(fetched.documents.len(), 2);
    assert_eq!(fetched.sources.len(), 2);
    assert_eq!(fetched.documents[0].packages[0].ord_id, "ns:package:P:v1");
    assert_eq!(fetched.sources[1]["openResourceDiscovery"], "1.9");
    assert!(fetched.aggregate_error().is_none());
}

#[tokio::test]
async fn zero_parallelism_still_fetches_sequentially() {
    let server = MockServer::start().await;
    mount_well_known(
        &server,
        json!({"openResourceDiscoveryV1": {"documents": [descriptor("/ord/a"), descriptor("/ord/b")]}}),
    )
    .await;
    mount_document(&server, "/ord/a", 200).await;
    mount_document(&server, "/ord/b", 200).await;

    let fetcher = fetcher(0);
    let ctx = RequestContext::default();
    let app = app();
    let webhook = webhook_for(&server);
    let fetch = fetcher.fetch_documents(&ctx, &app, &webhook);
    let fetched = tokio::time::timeout(std::time::Duration::from_secs(10), fetch)
        .await
        .expect("fetch must not wait on an empty semaphore")
        .unwrap();

    assert_eq!(fetched.documents.len(), 2);
    assert!(fetched.aggregate_error().is_none());
}

#[tokio::test]
async fn partial_failures_are_aggregated_once_each() {
    let server = MockServer::start().await;
    mount_well_known(
        &server,
        json!({
            "baseUrl": server.uri(),
            "openResourceDiscoveryV1": {"documents": [
                descriptor("/ok-1"), descriptor("/fail-a"), descriptor("/ok-2"),
                descriptor("/fail-b"), descriptor("/ok-3")
            ]}
        }),
    )
    .await;
    for ok in ["/ok-1", "/ok-2", "/ok-3"] {
        mount_document(&server, ok, 200).await;
    }
    mount_document(&server, "/fail-a", 500).await;
    mount_document(&server, "/fail-b", 404).await;

    let fetched = fetcher(2)
        .fetch_documents(&RequestContext::default(), &app(), &webhook_for(&server))
        .await
        .unwrap();

    assert_eq!(fetched.documents.len(), 3);
    let aggregate = fetched.aggregate_error().unwrap();
    assert_eq!(aggregate.len(), 2);
    let message = aggregate.to_string();
    assert_eq!(message.matches("/fail-a").count(), 1);
    assert_eq!(message.matches("/fail-b").count(), 1);
    assert_eq!(message.lines().count(), 2);
    assert!(!message.contains("/ok-"));
}

#[tokio::test]
async fn perspective_is_tagged_from_descriptor() {
    let server = MockServer::start().await;
    let mut versioned = descriptor("/ord/versioned");
    versioned["perspective"] = json!("system-version");
    mount_well_known(
        &server,
        json!({"openResourceDiscoveryV1": {"documents": [versioned, descriptor("/ord/instance")]}}),
    )
    .await;
    mount_document(&server, "/ord/versioned", 200).await;
    mount_document(&server, "/ord/instance", 200).await;

    let fetched = fetcher(1)
        .fetch_documents(&RequestContext::default(), &app(), &webhook_for(&server))
        .await
        .unwrap();

    assert_eq!(fetched.documents[0].perspective, Perspective::SystemVersion);
    assert_eq!(fetched.documents[1].perspective, Perspective::SystemInstance);
}

// -- Tenant -------------------------------------------------------------------

#[tokio::test]
async fn template_webhook_without_tenant_is_fatal() {
    let server = MockServer::start().await;
    let mut webhook = webhook_for(&server);
    webhook.owner = WebhookOwner::ApplicationTemplate;

    let err = fetcher(1)
        .fetch_documents(&RequestContext::default(), &app(), &webhook)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::MissingTenant { resource_id } if resource_id == "app-1"));
}

#[tokio::test]
async fn template_webhook_forwards_external_tenant() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WELL_KNOWN_SUFFIX))
        .and(header("Tenant", "ext-tenant"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"openResourceDiscoveryV1": {"documents": [descriptor("/ord/a")]}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ord/a"))
        .and(header("Tenant", "ext-tenant"))
        .respond_with(ResponseTemplate::new(200).set_body_json(minimal_document()))
        .mount(&server)
        .await;

    let mut webhook = webhook_for(&server);
    webhook.owner = WebhookOwner::ApplicationTemplate;
    let ctx = RequestContext::with_tenant("int-tenant", "ext-tenant");

    let fetched = fetcher(1).fetch_documents(&ctx, &app(), &webhook).await.unwrap();
    assert_eq!(fetched.documents.len(), 1);

    let template = Resource {
        resource_type: ResourceType::ApplicationTemplate,
        ..app()
    };
    let err = fetcher(1)
        .fetch_documents(&RequestContext::default(), &template, &webhook)
        .await
        .unwrap_err();
    // No tenant is required for the template itself, so the header-matched
    // mock does not answer.
    assert!(matches!(err, FetchError::ApiError { status: 404, .. }));
}

// -- Fatal well-known problems ------------------------------------------------

#[tokio::test]
async fn well_known_non_200_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WELL_KNOWN_SUFFIX))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let err = fetcher(1)
        .fetch_documents(&RequestContext::default(), &app(), &webhook_for(&server))
        .await
        .unwrap_err();
    match err {
        FetchError::ApiError { status, body, .. } => {
            assert_eq!(status, 503);
            assert_eq!(body, "unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn well_known_invalid_json_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WELL_KNOWN_SUFFIX))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = fetcher(1)
        .fetch_documents(&RequestContext::default(), &app(), &webhook_for(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Deserialization { .. }));
}

#[tokio::test]
async fn well_known_with_empty_documents_is_fatal() {
    let server = MockServer::start().await;
    mount_well_known(&server, json!({"openResourceDiscoveryV1": {"documents": []}})).await;

    let err = fetcher(1)
        .fetch_documents(&RequestContext::default(), &app(), &webhook_for(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidConfig(_)));
}

#[tokio::test]
async fn well_known_relative_url_without_base_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/config"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"openResourceDiscoveryV1": {"documents": [descriptor("/ord/a")]}})),
        )
        .mount(&server)
        .await;

    let webhook = Webhook::open(format!("{}/config", server.uri()));
    let err = fetcher(1)
        .fetch_documents(&RequestContext::default(), &app(), &webhook)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("requires a base URL"));
}

// -- Per-document handling ----------------------------------------------------

#[tokio::test]
async fn documents_without_supported_strategy_are_skipped() {
    let server = MockServer::start().await;
    mount_well_known(
        &server,
        json!({"openResourceDiscoveryV1": {"documents": [
            {"url": "/ord/secured", "accessStrategies": [{"type": "custom", "customType": "acme:mtls:v1"}]},
            descriptor("/ord/open")
        ]}}),
    )
    .await;
    mount_document(&server, "/ord/open", 200).await;

    let fetched = fetcher(2)
        .fetch_documents(&RequestContext::default(), &app(), &webhook_for(&server))
        .await
        .unwrap();
    assert_eq!(fetched.documents.len(), 1);
    assert!(fetched.aggregate_error().is_none());
}

#[tokio::test]
async fn oversized_document_is_a_per_document_failure() {
    let server = MockServer::start().await;
    mount_well_known(
        &server,
        json!({"openResourceDiscoveryV1": {"documents": [descriptor("/ord/huge"), descriptor("/ord/small")]}}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/ord/huge"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(MAX_DOCUMENT_BYTES + 1)))
        .mount(&server)
        .await;
    mount_document(&server, "/ord/small", 200).await;

    let fetched = fetcher(2)
        .fetch_documents(&RequestContext::default(), &app(), &webhook_for(&server))
        .await
        .unwrap();
    assert_eq!(fetched.documents.len(), 1);
    let failures = fetched.aggregate_error().unwrap().failures();
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0].error, FetchError::BodyTooLarge { limit, .. } if limit == MAX_DOCUMENT_BYTES));
}

#[tokio::test]
async fn proxy_url_replaces_fetch_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/proxy{WELL_KNOWN_SUFFIX}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"openResourceDiscoveryV1": {"documents": [descriptor("/ord/a")]}})),
        )
        .mount(&server)
        .await;
    mount_document(&server, "/proxy/ord/a", 200).await;

    let mut webhook = Webhook::open(format!("https://app.example.com{WELL_KNOWN_SUFFIX}"));
    webhook.proxy_url = Some(format!("{}/proxy{WELL_KNOWN_SUFFIX}", server.uri()));

    let fetched = fetcher(1)
        .fetch_documents(&RequestContext::default(), &app(), &webhook)
        .await
        .unwrap();
    assert_eq!(fetched.base_url, "https://app.example.com");
    assert_eq!(fetched.documents.len(), 1);
}

#[tokio::test]
async fn basic_credentials_secure_the_well_known_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WELL_KNOWN_SUFFIX))
        .and(header("Authorization", "Basic c3ZjOnB3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"openResourceDiscoveryV1": {"documents": [descriptor("/ord/a")]}})),
        )
        .mount(&server)
        .await;
    mount_document(&server, "/ord/a", 200).await;

    let mut webhook = webhook_for(&server);
    webhook.auth = Some(WebhookAuth::Basic {
        username: "svc".to_string(),
        password: zeroize::Zeroizing::new("pw".to_string()),
    });

    let fetched = fetcher(1)
        .fetch_documents(&RequestContext::default(), &app(), &webhook)
        .await
        .unwrap();
    assert_eq!(fetched.documents.len(), 1);
}

#[tokio::test]
async fn unsupported_webhook_access_strategy_is_fatal() {
    let server = MockServer::start().await;
    let mut webhook = webhook_for(&server);
    webhook.auth = Some(WebhookAuth::AccessStrategy("acme:mtls:v1".to_string()));

    let err = fetcher(1)
        .fetch_documents(&RequestContext::default(), &app(), &webhook)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::AccessStrategy(_)));
}

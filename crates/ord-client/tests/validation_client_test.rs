//! Contract tests for ValidationClient.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST | `/api/v1/document/validate?ruleset=…` | `validate_*` |

use ord_client::{ValidationClient, ValidationClientError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ValidationClient {
    ValidationClient::new(reqwest::Client::new(), server.uri().parse().unwrap())
}

#[tokio::test]
async fn validate_returns_findings() {
    let server = MockServer::start().await;
    let document = json!({"openResourceDiscovery": "1.9", "apiResources": [{"ordId": "ns:apiResource:A:v1"}]});

    Mock::given(method("POST"))
        .and(path("/api/v1/document/validate"))
        .and(query_param("ruleset", "sap:base-v1"))
        .and(header("Content-Type", "application/json;charset=UTF-8"))
        .and(body_json(&document))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "code": "sap-ord-api-resource-title",
                "path": ["apiResources", "0", "title"],
                "message": "title is missing",
                "severity": "error",
                "productStandards": []
            },
            {
                "code": "ord-description-length",
                "path": ["description"],
                "message": "description is short",
                "severity": "warning"
            }
        ])))
        .mount(&server)
        .await;

    let findings = client(&server).validate("sap:base-v1", &document).await.unwrap();
    assert_eq!(findings.len(), 2);
    assert!(findings[0].is_error());
    assert_eq!(findings[0].path, vec!["apiResources", "0", "title"]);
    assert!(!findings[1].is_error());
}

#[tokio::test]
async fn validate_non_200_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/document/validate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("ruleset unknown"))
        .mount(&server)
        .await;

    let err = client(&server).validate("nope", &json!({})).await.unwrap_err();
    match err {
        ValidationClientError::ApiError { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "ruleset unknown");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn validate_rejects_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/document/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"not": "an array"})))
        .mount(&server)
        .await;

    let err = client(&server).validate("r", &json!({})).await.unwrap_err();
    assert!(matches!(err, ValidationClientError::Deserialization { .. }));
}

//! Client for the delegated rule validator.
//!
//! `POST {base}/api/v1/document/validate?ruleset={ruleset}` with the raw
//! document as body. The validator answers with a JSON array of findings,
//! each addressed by a path into the document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::ValidationClientError;

const VALIDATE_PATH: &str = "api/v1/document/validate";
const CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// One finding reported by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub code: String,
    #[serde(default)]
    pub path: Vec<String>,
    pub message: String,
    pub severity: String,
    #[serde(default)]
    pub product_standards: Vec<String>,
}

impl ValidationResult {
    pub fn is_error(&self) -> bool {
        self.severity.eq_ignore_ascii_case("error")
    }
}

#[derive(Debug, Clone)]
pub struct ValidationClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ValidationClient {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, ruleset: &str) -> Result<Url, ValidationClientError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut url = base
            .join(VALIDATE_PATH)
            .map_err(|e| ValidationClientError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("ruleset", ruleset);
        Ok(url)
    }

    pub async fn validate(
        &self,
        ruleset: &str,
        document: &Value,
    ) -> Result<Vec<ValidationResult>, ValidationClientError> {
        let url = self.endpoint_url(ruleset)?;
        let endpoint = format!("POST {url}");
        let body = serde_json::to_vec(document)?;

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|source| ValidationClientError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;

        if resp.status() != reqwest::StatusCode::OK {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ValidationClientError::ApiError {
                endpoint,
                status,
                body,
            });
        }

        resp.json::<Vec<ValidationResult>>()
            .await
            .map_err(|source| ValidationClientError::Deserialization { endpoint, source })
    }
}

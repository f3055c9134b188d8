//! Base URL consistency between the fetch context and described system
//! instances.

use ord_core::validation::{BASE_URL_MISMATCH, NO_BASE_URL};
use ord_core::{Document, ValidationError};

/// Check every document against the effective base URL.
///
/// An empty `base_url` is filled by the first described system instance base
/// URL. A document that leaves the base URL empty gets `sap-ord-no-base-url`;
/// a document describing a different one gets `sap-ord-base-url-mismatch`.
/// Returns the effective base URL with the findings.
pub fn check_base_urls(documents: &[Document], base_url: &str) -> (String, Vec<ValidationError>) {
    let mut effective = base_url.trim_end_matches('/').to_string();
    let mut findings = Vec::new();

    for (index, doc) in documents.iter().enumerate() {
        let described = doc
            .described_base_url()
            .map(|u| u.trim_end_matches('/'))
            .filter(|u| !u.is_empty());
        match described {
            None if effective.is_empty() => {
                tracing::warn!(document = index, "no base URL for document");
                findings.push(ValidationError::error(
                    "",
                    NO_BASE_URL,
                    format!("document {index} has no base URL and none was discovered"),
                ));
            }
            None => {}
            Some(url) if effective.is_empty() => effective = url.to_string(),
            Some(url) if url != effective => findings.push(ValidationError::error(
                "",
                BASE_URL_MISMATCH,
                format!("document {index} describes base URL {url:?}, expected {effective:?}"),
            )),
            Some(_) => {}
        }
    }
    (effective, findings)
}

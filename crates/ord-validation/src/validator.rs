//! # Document Validator
//!
//! Two entry points over a sanitized batch:
//!
//! - [`DocumentValidator::validate`] asks the delegated rule service about
//!   every raw document, excises resources named by `error` findings that are
//!   not on the ignore list, then runs the structural checks (base URL,
//!   duplicates, references) and returns every finding.
//! - [`DocumentValidator::validate_local`] runs the structural checks, the
//!   hash gate and the field rules without a network hop, and fails with one
//!   [`RuleViolations`] aggregate when any error was found.
//!
//! Both mutate the documents in place: whatever an `error` finding names is
//! gone from the batch afterwards.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use ord_client::{ValidationClient, ValidationClientError, ValidationResult};
use ord_core::value::ord_id_along_path;
use ord_core::{Document, ValidationError};
use serde_json::Value;

use crate::base_url::check_base_urls;
use crate::duplicates::{detect_duplicates, index_packages};
use crate::error::{RuleViolations, ValidatorError};
use crate::hash_gate::check_versions;
use crate::ignore::IgnoreList;
use crate::references::check_references;
use crate::rules::{apply_field_rules, PackagePolicyLevels};
use crate::stored::{GlobalOrdIds, StoredResources};

/// Externally hosted rule validation.
#[async_trait]
pub trait RuleValidationService: Send + Sync {
    async fn validate(&self, ruleset: &str, document: &Value) -> Result<Vec<ValidationResult>, ValidationClientError>;
}

#[async_trait]
impl RuleValidationService for ValidationClient {
    async fn validate(&self, ruleset: &str, document: &Value) -> Result<Vec<ValidationResult>, ValidationClientError> {
        ValidationClient::validate(self, ruleset, document).await
    }
}

#[derive(Clone, Default)]
pub struct DocumentValidator {
    rule_service: Option<Arc<dyn RuleValidationService>>,
    ignore_list: IgnoreList,
}

impl fmt::Debug for DocumentValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentValidator")
            .field("rule_service", &self.rule_service.is_some())
            .field("ignore_list", &self.ignore_list)
            .finish()
    }
}

impl DocumentValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule_service(mut self, service: Arc<dyn RuleValidationService>) -> Self {
        self.rule_service = Some(service);
        self
    }

    pub fn with_ignore_list(mut self, ignore_list: IgnoreList) -> Self {
        self.ignore_list = ignore_list;
        self
    }

    pub fn ignore_list(&self) -> &IgnoreList {
        &self.ignore_list
    }

    pub fn has_rule_service(&self) -> bool {
        self.rule_service.is_some()
    }

    /// Delegated validation followed by the structural checks.
    ///
    /// `sources` are the raw document bodies in the same order as
    /// `documents`. Without a configured rule service the delegated step is
    /// skipped and `sources` is not inspected.
    #[tracing::instrument(skip_all, fields(documents = documents.len(), ruleset = %ruleset))]
    pub async fn validate(
        &self,
        documents: &mut [Document],
        base_url: &str,
        globals: &GlobalOrdIds,
        sources: &[String],
        ruleset: &str,
        app_namespace: &str,
    ) -> Result<Vec<ValidationError>, ValidatorError> {
        let mut findings = match &self.rule_service {
            Some(service) => {
                self.delegate(service.as_ref(), documents, sources, ruleset, app_namespace)
                    .await?
            }
            None => {
                tracing::debug!("no rule validation service configured, skipping delegated rules");
                Vec::new()
            }
        };
        let (_, structural) = structural_checks(documents, base_url, globals);
        findings.extend(structural);
        Ok(findings)
    }

    async fn delegate(
        &self,
        service: &dyn RuleValidationService,
        documents: &mut [Document],
        sources: &[String],
        ruleset: &str,
        app_namespace: &str,
    ) -> Result<Vec<ValidationError>, ValidatorError> {
        if sources.len() != documents.len() {
            return Err(ValidatorError::SourceCountMismatch {
                expected: documents.len(),
                actual: sources.len(),
            });
        }

        let mut findings = Vec::new();
        for (index, (doc, source)) in documents.iter_mut().zip(sources).enumerate() {
            let raw: Value =
                serde_json::from_str(source).map_err(|source| ValidatorError::InvalidSource { index, source })?;
            let results = service
                .validate(ruleset, &raw)
                .await
                .map_err(|source| ValidatorError::Delegated { index, source })?;

            for result in results {
                let ord_id = ord_id_along_path(&raw, &result.path).unwrap_or_default();
                let finding = if result.is_error() {
                    ValidationError::error(ord_id, &result.code, result.message)
                } else {
                    ValidationError::warning(ord_id, &result.code, result.message)
                };
                self.excise(doc, &finding, app_namespace);
                findings.push(finding);
            }
        }
        Ok(findings)
    }

    fn excise(&self, doc: &mut Document, finding: &ValidationError, app_namespace: &str) {
        if !finding.is_error() || finding.ord_id.is_empty() {
            return;
        }
        if self
            .ignore_list
            .is_ignored(app_namespace, &finding.ord_id, &finding.error_type)
        {
            tracing::debug!(ord_id = %finding.ord_id, code = %finding.error_type, "finding ignored");
            return;
        }
        if let Some(kind) = doc.remove_resource(&finding.ord_id) {
            tracing::info!(ord_id = %finding.ord_id, %kind, code = %finding.error_type, "resource excised");
        }
    }

    /// Structural checks, hash gate, and field rules without delegation.
    ///
    /// Returns the warnings on success. Any error finding makes the call fail
    /// with every error and warning collected over the whole batch.
    #[tracing::instrument(skip_all, fields(documents = documents.len()))]
    pub fn validate_local(
        &self,
        documents: &mut [Document],
        base_url: &str,
        stored: &StoredResources,
        globals: &GlobalOrdIds,
    ) -> Result<Vec<ValidationError>, RuleViolations> {
        let (packages, mut findings) = structural_checks(documents, base_url, globals);
        findings.extend(check_versions(documents, stored));
        for doc in documents.iter_mut() {
            findings.extend(apply_field_rules(doc, &packages));
        }

        let (errors, warnings): (Vec<_>, Vec<_>) = findings.into_iter().partition(ValidationError::is_error);
        if errors.is_empty() {
            return Ok(warnings);
        }
        tracing::warn!(errors = errors.len(), warnings = warnings.len(), "local validation failed");
        Err(RuleViolations { errors, warnings })
    }
}

/// Base URL, duplicates, and references, in that order.
fn structural_checks(
    documents: &mut [Document],
    base_url: &str,
    globals: &GlobalOrdIds,
) -> (PackagePolicyLevels, Vec<ValidationError>) {
    let (_, mut findings) = check_base_urls(documents, base_url);
    let packages = index_packages(documents);
    let (ids, duplicates) = detect_duplicates(documents);
    findings.extend(duplicates);
    findings.extend(check_references(documents, &ids, globals));
    (packages, findings)
}

//! Parsed view of an ORD identifier.
//!
//! Format: `<namespace>:<kind>:<localId>:<versionSuffix>`. The version suffix
//! may be empty (vendors, products). Parsing here only checks the four-part
//! shape; per-kind patterns live with the field rules.

use std::fmt;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrdId {
    raw: String,
    kind_start: usize,
    local_start: usize,
    suffix_start: usize,
}

impl OrdId {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 4 || parts[..3].iter().any(|p| p.is_empty()) {
            return Err(CoreError::InvalidOrdId(raw.to_string()));
        }
        let kind_start = parts[0].len() + 1;
        let local_start = kind_start + parts[1].len() + 1;
        let suffix_start = local_start + parts[2].len() + 1;
        Ok(Self {
            raw: raw.to_string(),
            kind_start,
            local_start,
            suffix_start,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.raw[..self.kind_start - 1]
    }

    pub fn kind(&self) -> &str {
        &self.raw[self.kind_start..self.local_start - 1]
    }

    pub fn local_id(&self) -> &str {
        &self.raw[self.local_start..self.suffix_start - 1]
    }

    pub fn version_suffix(&self) -> &str {
        &self.raw[self.suffix_start..]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for OrdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Namespace prefix of an identifier without full parsing. Returns the whole
/// string when it contains no `:`.
pub fn namespace_of(raw: &str) -> &str {
    raw.split(':').next().unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_parts() {
        let id = OrdId::parse("sap.s4:apiResource:Orders:v1").unwrap();
        assert_eq!(id.namespace(), "sap.s4");
        assert_eq!(id.kind(), "apiResource");
        assert_eq!(id.local_id(), "Orders");
        assert_eq!(id.version_suffix(), "v1");
        assert_eq!(id.to_string(), "sap.s4:apiResource:Orders:v1");
    }

    #[test]
    fn empty_suffix_is_allowed() {
        let id = OrdId::parse("sap:vendor:SAP:").unwrap();
        assert_eq!(id.kind(), "vendor");
        assert_eq!(id.version_suffix(), "");
    }

    #[test]
    fn rejects_wrong_shape() {
        assert!(OrdId::parse("sap:vendor:SAP").is_err());
        assert!(OrdId::parse(":vendor:SAP:").is_err());
        assert!(OrdId::parse("a:b:c:d:e").is_err());
    }

    #[test]
    fn namespace_of_without_parsing() {
        assert_eq!(namespace_of("acme.sales:package:P:v1"), "acme.sales");
        assert_eq!(namespace_of("plain"), "plain");
    }
}

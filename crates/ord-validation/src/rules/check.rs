//! Per-resource finding collector.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate};
use ord_core::validation::INVALID_FIELD;
use ord_core::ValidationError;
use regex::Regex;
use serde_json::Value;

/// Collects field problems of one resource and turns them into
/// `sap-ord-invalid-field` findings.
#[derive(Debug)]
pub(crate) struct FieldCheck {
    ord_id: String,
    problems: Vec<(String, String)>,
}

impl FieldCheck {
    pub(crate) fn new(ord_id: &str) -> Self {
        Self {
            ord_id: ord_id.to_string(),
            problems: Vec::new(),
        }
    }

    pub(crate) fn fail(&mut self, field: impl Into<String>, problem: impl Into<String>) {
        self.problems.push((field.into(), problem.into()));
    }

    pub(crate) fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    pub(crate) fn into_findings(self) -> Vec<ValidationError> {
        let ord_id = self.ord_id;
        self.problems
            .into_iter()
            .map(|(field, problem)| ValidationError::error(&ord_id, INVALID_FIELD, format!("{field}: {problem}")))
            .collect()
    }

    // -- Scalars ----------------------------------------------------------

    pub(crate) fn required(&mut self, field: &str, value: &str) -> bool {
        if value.is_empty() {
            self.fail(field, "is required");
            return false;
        }
        true
    }

    pub(crate) fn required_opt(&mut self, field: &str, value: Option<&str>) -> bool {
        self.required(field, value.unwrap_or_default())
    }

    pub(crate) fn matches(&mut self, field: &str, value: &str, pattern: &Regex) {
        if self.required(field, value) && !pattern.is_match(value) {
            self.fail(field, format!("{value:?} does not match {}", pattern.as_str()));
        }
    }

    pub(crate) fn matches_if_present(&mut self, field: &str, value: Option<&str>, pattern: &Regex) {
        if let Some(value) = value {
            self.matches(field, value, pattern);
        }
    }

    /// Required, at most 255 characters, single line.
    pub(crate) fn short_text(&mut self, field: &str, value: Option<&str>) {
        let value = value.unwrap_or_default();
        if !self.required(field, value) {
            return;
        }
        if value.chars().count() > 255 {
            self.fail(field, "is longer than 255 characters");
        }
        if value.contains('\n') {
            self.fail(field, "must not contain line breaks");
        }
    }

    pub(crate) fn one_of(&mut self, field: &str, value: Option<&str>, allowed: &[&str], required: bool) {
        match value {
            None | Some("") if required => self.fail(field, "is required"),
            None | Some("") => {}
            Some(v) if !allowed.contains(&v) => {
                self.fail(field, format!("{v:?} is not one of {}", allowed.join(", ")))
            }
            Some(_) => {}
        }
    }

    pub(crate) fn date_time(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            if !is_date_time(v) {
                self.fail(field, format!("{v:?} is not an RFC 3339 timestamp"));
            }
        }
    }

    // -- Arrays and objects -------------------------------------------------

    /// Optional array of strings; when present it must be non-empty and every
    /// element must match `pattern`.
    pub(crate) fn string_array(&mut self, field: &str, value: Option<&Value>, pattern: &Regex) -> Vec<String> {
        let Some(value) = value else {
            return Vec::new();
        };
        let Some(items) = self.strings(field, value) else {
            return Vec::new();
        };
        for item in items.iter().filter(|i| !pattern.is_match(i)) {
            self.fail(field, format!("element {item:?} does not match {}", pattern.as_str()));
        }
        items
    }

    /// Every element must be one of `allowed`.
    pub(crate) fn allowed_items(&mut self, field: &str, value: Option<&Value>, allowed: &[&str]) {
        let Some(items) = value.and_then(|v| self.strings(field, v)) else {
            return;
        };
        for item in items.iter().filter(|i| !allowed.contains(&i.as_str())) {
            self.fail(field, format!("{item:?} is not an allowed value"));
        }
    }

    /// Required array of unique strings.
    pub(crate) fn unique_strings(&mut self, field: &str, value: Option<&Value>) -> Vec<String> {
        let Some(items) = value.and_then(|v| self.strings(field, v)) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.as_str()) {
                self.fail(field, format!("{item:?} is listed twice"));
            }
        }
        items
    }

    fn strings(&mut self, field: &str, value: &Value) -> Option<Vec<String>> {
        let Value::Array(items) = value else {
            self.fail(field, "must be an array");
            return None;
        };
        if items.is_empty() {
            self.fail(field, "must not be empty");
            return None;
        }
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item.as_str() {
                Some(s) => out.push(s.to_string()),
                None => {
                    self.fail(field, "must contain only strings");
                    return None;
                }
            }
        }
        Some(out)
    }

    /// Non-empty array of objects.
    pub(crate) fn objects<'v>(&mut self, field: &str, value: Option<&'v Value>) -> Vec<&'v serde_json::Map<String, Value>> {
        let Some(value) = value else {
            return Vec::new();
        };
        let Value::Array(items) = value else {
            self.fail(field, "must be an array");
            return Vec::new();
        };
        if items.is_empty() {
            self.fail(field, "must not be empty");
        }
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item.as_object() {
                Some(obj) => out.push(obj),
                None => self.fail(field, "must contain only objects"),
            }
        }
        out
    }

    /// Labels: object keyed by label names with string-array values.
    pub(crate) fn labels(&mut self, field: &str, value: Option<&Value>, key_pattern: &Regex) {
        let Some(value) = value else {
            return;
        };
        let Value::Object(map) = value else {
            self.fail(field, "must be an object");
            return;
        };
        for (key, values) in map {
            if !key_pattern.is_match(key) {
                self.fail(field, format!("key {key:?} does not match {}", key_pattern.as_str()));
            }
            let ok = values
                .as_array()
                .is_some_and(|a| a.iter().all(Value::is_string));
            if !ok {
                self.fail(field, format!("values of {key:?} must be an array of strings"));
            }
        }
    }

    /// Link objects with a required `url`, plus `title` and an optional
    /// `type` drawn from `types`.
    pub(crate) fn links(&mut self, field: &str, value: Option<&Value>, types: Option<&[&str]>) {
        for link in self.objects(field, value) {
            if str_field(link, "url").is_empty() {
                self.fail(field, "every link needs a url");
            }
            if let Some(types) = types {
                let link_type = str_field(link, "type");
                if !types.contains(&link_type) {
                    self.fail(field, format!("link type {link_type:?} is not allowed"));
                }
                if link_type == "custom" && str_field(link, "customType").is_empty() {
                    self.fail(field, "custom link needs a customType");
                }
            } else if str_field(link, "title").is_empty() {
                self.fail(field, "every link needs a title");
            }
        }
    }

    /// Changelog entries: semver version, known release status, plain date.
    pub(crate) fn changelog(&mut self, field: &str, value: Option<&Value>, semver: &Regex, statuses: &[&str]) {
        for entry in self.objects(field, value) {
            let version = str_field(entry, "version");
            if !semver.is_match(version) {
                self.fail(field, format!("entry version {version:?} is not a semantic version"));
            }
            let status = str_field(entry, "releaseStatus");
            if !statuses.contains(&status) {
                self.fail(field, format!("entry release status {status:?} is not allowed"));
            }
            let date = str_field(entry, "date");
            if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                self.fail(field, format!("entry date {date:?} is not YYYY-MM-DD"));
            }
        }
    }
}

pub(crate) fn str_field<'v>(obj: &'v serde_json::Map<String, Value>, key: &str) -> &'v str {
    obj.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// RFC 3339, or the same with a numeric `+hhmm` offset.
pub(crate) fn is_date_time(raw: &str) -> bool {
    DateTime::parse_from_rfc3339(raw).is_ok() || DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codes(check: FieldCheck) -> Vec<String> {
        check.into_findings().into_iter().map(|f| f.description).collect()
    }

    #[test]
    fn short_text_limits() {
        let mut check = FieldCheck::new("x");
        check.short_text("shortDescription", Some(&"a".repeat(256)));
        check.short_text("title", Some("two\nlines"));
        check.short_text("other", None);
        let problems = codes(check);
        assert_eq!(problems.len(), 3);
        assert!(problems[0].starts_with("shortDescription:"));
    }

    #[test]
    fn string_arrays_must_be_non_empty_strings() {
        let re = Regex::new("^[A-Z]{2}$").unwrap();
        let mut check = FieldCheck::new("x");
        check.string_array("countries", Some(&json!([])), &re);
        check.string_array("countries", Some(&json!(["DE", 1])), &re);
        check.string_array("countries", Some(&json!(["DE", "usa"])), &re);
        assert_eq!(codes(check).len(), 3);

        let mut clean = FieldCheck::new("x");
        clean.string_array("countries", Some(&json!(["DE", "US"])), &re);
        clean.string_array("countries", None, &re);
        assert!(clean.is_clean());
    }

    #[test]
    fn links_with_and_without_types() {
        let mut check = FieldCheck::new("x");
        check.links("links", Some(&json!([{"title": "t", "url": "https://a"}])), None);
        check.links(
            "packageLinks",
            Some(&json!([{"type": "license", "url": "https://a"}])),
            Some(&["license"]),
        );
        assert!(check.is_clean());

        let mut bad = FieldCheck::new("x");
        bad.links("links", Some(&json!([{"url": ""}])), None);
        bad.links("packageLinks", Some(&json!([{"type": "bogus", "url": "u"}])), Some(&["license"]));
        assert_eq!(codes(bad).len(), 3);
    }

    #[test]
    fn timestamps() {
        assert!(is_date_time("2024-01-31T10:00:00Z"));
        assert!(is_date_time("2024-01-31T10:00:00+0100"));
        assert!(!is_date_time("2024-01-31"));
    }

    #[test]
    fn unique_strings_flags_repeats() {
        let mut check = FieldCheck::new("x");
        let items = check.unique_strings("entryPoints", Some(&json!(["/a", "/a"])));
        assert_eq!(items.len(), 2);
        assert!(!check.is_clean());
    }
}

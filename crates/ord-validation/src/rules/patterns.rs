//! Identifier patterns, enumerations, and allowed value lists of the ORD
//! rule set.

use std::sync::LazyLock;

use regex::Regex;

macro_rules! patterns {
    ($($name:ident = $pattern:expr;)+) => {
        $(
            pub static $name: LazyLock<Regex> =
                LazyLock::new(|| Regex::new($pattern).expect(concat!("static pattern ", stringify!($name))));
        )+
    };
}

patterns! {
    SEMVER = ord_core::version::SEMVER_PATTERN;
    PACKAGE_ID = r"^([a-zA-Z0-9._\-]+):(package):([a-zA-Z0-9._\-]+):(alpha|beta|v[0-9]+)$";
    VENDOR_ID = r"^([a-zA-Z0-9._\-]+):(vendor):([a-zA-Z0-9._\-]+):()$";
    PRODUCT_ID = r"^([a-zA-Z0-9._\-]+):(product):([a-zA-Z0-9._\-]+):()$";
    BUNDLE_ID = r"^([a-zA-Z0-9._\-]+):(consumptionBundle):([a-zA-Z0-9._\-]+):v([0-9]+)$";
    TOMBSTONE_ID = r"^([a-zA-Z0-9._\-]+):(package|consumptionBundle|product|vendor|apiResource|eventResource|entityType|capability|integrationDependency|dataProduct):([a-zA-Z0-9._\-]+):(alpha|beta|v[0-9]+|)$";
    API_ID = r"^([a-zA-Z0-9._\-]+):(apiResource):([a-zA-Z0-9._\-]+):(alpha|beta|v[0-9]+)$";
    EVENT_ID = r"^([a-zA-Z0-9._\-]+):(eventResource):([a-zA-Z0-9._\-]+):(alpha|beta|v[0-9]+)$";
    ENTITY_TYPE_ID = r"^([a-zA-Z0-9._\-]+):(entityType):([a-zA-Z0-9._\-]+):(alpha|beta|v[0-9]+)$";
    CAPABILITY_ID = r"^([a-zA-Z0-9._\-]+):(capability):([a-zA-Z0-9._\-]+):(alpha|beta|v[0-9]+)$";
    INTEGRATION_DEPENDENCY_ID = r"^([a-zA-Z0-9._\-]+):(integrationDependency):([a-zA-Z0-9._\-]+):(alpha|beta|v[0-9]+)$";
    DATA_PRODUCT_ID = r"^([a-zA-Z0-9._\-]+):(dataProduct):([a-zA-Z0-9._\-]+):(alpha|beta|v[0-9]+)$";
    SYSTEM_INSTANCE_BASE_URL = r"^http[s]?://[^:/\s]+\.[^:/\s\.]+(:\d+)?$";
    STRING_ARRAY_ELEMENT = r"^[a-zA-Z0-9 -\./]*$";
    COUNTRY = r"^[A-Z]{2}$";
    CORRELATION_ID = r"^([a-zA-Z0-9._\-]+):([a-zA-Z0-9._\-/]+)$";
    LABEL_KEY = r"^[a-zA-Z0-9\-_.]*$";
    CUSTOM_TYPE = r"^([a-z0-9.]+):([a-zA-Z0-9._\-]+):v([0-9]+)$";
    SAP_NAMESPACE = r"^(sap)((\.)([a-zA-Z0-9._\-])+)*$";
}

pub const POLICY_LEVEL_SAP: &str = "sap:core:v1";
pub const POLICY_LEVEL_SAP_PARTNER: &str = "sap:partner:v1";
pub const POLICY_LEVEL_CUSTOM: &str = "custom";
pub const POLICY_LEVELS: &[&str] = &[POLICY_LEVEL_SAP, POLICY_LEVEL_SAP_PARTNER, POLICY_LEVEL_CUSTOM];

pub const RELEASE_STATUS_DEPRECATED: &str = "deprecated";
pub const RELEASE_STATUSES: &[&str] = &["beta", "active", RELEASE_STATUS_DEPRECATED];

pub const VISIBILITY_PRIVATE: &str = "private";
pub const VISIBILITIES: &[&str] = &["public", "internal", VISIBILITY_PRIVATE];

pub const API_PROTOCOLS: &[&str] = &["odata-v2", "odata-v4", "soap-inbound", "soap-outbound", "rest", "sap-rfc"];

pub const IMPLEMENTATION_STANDARD_CUSTOM: &str = "custom";
pub const API_IMPLEMENTATION_STANDARDS: &[&str] = &[
    "sap:ord-document-api:v1",
    "cff:open-service-broker:v2",
    "sap:csn-exposure:v1",
    IMPLEMENTATION_STANDARD_CUSTOM,
];

pub const PACKAGE_LINK_TYPES: &[&str] = &[
    "terms-of-service",
    "license",
    "client-registration",
    "payment",
    "sandbox",
    "service-level-agreement",
    "support",
    "custom",
];

pub const API_LINK_TYPES: &[&str] = &[
    "api-documentation",
    "authentication",
    "client-registration",
    "console",
    "payment",
    "service-level-agreement",
    "support",
    "custom",
];

pub const EXTENSIBLE_SUPPORT: &[&str] = &["no", "manual", "automatic"];

pub const CAPABILITY_TYPES: &[&str] = &["sap.mdo:mdi-capability:v1", "custom"];
pub const DATA_PRODUCT_TYPES: &[&str] = &["primary", "derived"];
pub const DATA_PRODUCT_CATEGORIES: &[&str] = &["business-object", "analytical", "other"];

pub const ORD_VERSIONS: &[&str] = &["1.0", "1.1", "1.2", "1.3", "1.4", "1.5", "1.6", "1.7", "1.8", "1.9"];

pub const SAP_VENDOR: &str = "sap:vendor:SAP:";

pub const LINES_OF_BUSINESS: &[&str] = &[
    "Asset Management",
    "Commerce",
    "Finance",
    "Human Resources",
    "Manufacturing",
    "Marketing",
    "R&D Engineering",
    "Sales",
    "Service",
    "Sourcing and Procurement",
    "Supply Chain",
    "Sustainability",
    "Metering",
    "Grid Operations and Maintenance",
    "Plant Operations and Maintenance",
    "Maintenance and Engineering",
];

pub const INDUSTRIES: &[&str] = &[
    "Aerospace and Defense",
    "Automotive",
    "Banking",
    "Chemicals",
    "Consumer Products",
    "Defense and Security",
    "Engineering Construction and Operations",
    "Healthcare",
    "Higher Education and Research",
    "High Tech",
    "Industrial Machinery and Components",
    "Insurance",
    "Life Sciences",
    "Media",
    "Mill Products",
    "Mining",
    "Oil and Gas",
    "Professional Services",
    "Public Sector",
    "Retail",
    "Sports and Entertainment",
    "Telecommunications",
    "Travel and Transportation",
    "Utilities",
    "Wholesale Distribution",
];

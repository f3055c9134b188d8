//! # Field Rules
//!
//! Per-kind rule table for the local validation path. Every failing field of
//! a resource produces one `sap-ord-invalid-field` finding naming the field;
//! a resource with any failing field is excised from its document.
//! Document-level problems are reported with an empty ORD ID and excise
//! nothing.
//!
//! Rules that depend on the policy level use the level of the package a
//! resource belongs to, falling back to the resource's own.

mod check;
pub mod patterns;

use std::collections::{HashMap, HashSet};

use ord_core::ord_id::namespace_of;
use ord_core::{
    ApiResource, Capability, Classification, ConsumptionBundle, ConsumptionBundleReference,
    DataProduct, Document, EntityType, EventResource, IntegrationDependency, OrdResource, Package,
    Product, ResourceDefinition, Tombstone, ValidationError, Vendor,
};
use regex::Regex;
use serde_json::Value;

use self::check::{str_field, FieldCheck};
use self::patterns::*;

/// Policy level per package ORD ID.
pub type PackagePolicyLevels = HashMap<String, Option<String>>;

/// Run the rule table over one document, excising failing resources.
pub fn apply_field_rules(doc: &mut Document, packages: &PackagePolicyLevels) -> Vec<ValidationError> {
    let ctx = RuleContext { packages };
    let mut findings = check_document(doc).into_findings();

    retain_valid(&mut doc.packages, &mut findings, check_package);
    retain_valid(&mut doc.consumption_bundles, &mut findings, check_bundle);
    retain_valid(&mut doc.products, &mut findings, check_product);
    retain_valid(&mut doc.vendors, &mut findings, check_vendor);
    retain_valid(&mut doc.api_resources, &mut findings, |api| check_api(api, &ctx));
    retain_valid(&mut doc.event_resources, &mut findings, |event| check_event(event, &ctx));
    retain_valid(&mut doc.entity_types, &mut findings, |entity| check_entity_type(entity, &ctx));
    retain_valid(&mut doc.capabilities, &mut findings, |cap| check_capability(cap, &ctx));
    retain_valid(&mut doc.integration_dependencies, &mut findings, |dep| {
        check_integration_dependency(dep, &ctx)
    });
    retain_valid(&mut doc.data_products, &mut findings, |dp| check_data_product(dp, &ctx));
    retain_valid(&mut doc.tombstones, &mut findings, check_tombstone);
    findings
}

fn retain_valid<R: OrdResource>(
    items: &mut Vec<R>,
    findings: &mut Vec<ValidationError>,
    check: impl Fn(&R) -> FieldCheck,
) {
    items.retain(|item| {
        let result = check(item);
        if result.is_clean() {
            return true;
        }
        tracing::debug!(ord_id = %item.ord_id(), kind = %R::KIND, "excising resource with invalid fields");
        findings.extend(result.into_findings());
        false
    });
}

struct RuleContext<'a> {
    packages: &'a PackagePolicyLevels,
}

impl RuleContext<'_> {
    fn policy_level<'s>(&'s self, part_of_package: Option<&str>, own: Option<&'s str>) -> Option<&'s str> {
        part_of_package
            .and_then(|p| self.packages.get(p))
            .and_then(|level| level.as_deref())
            .or(own)
    }
}

fn is_sap_or_partner(level: Option<&str>) -> bool {
    matches!(level, Some(POLICY_LEVEL_SAP | POLICY_LEVEL_SAP_PARTNER))
}

// -- Document -----------------------------------------------------------------

fn check_document(doc: &Document) -> FieldCheck {
    let mut c = FieldCheck::new("");
    c.one_of("openResourceDiscovery", Some(doc.open_resource_discovery.as_str()), ORD_VERSIONS, true);
    c.one_of("policyLevel", doc.policy_level.as_deref(), POLICY_LEVELS, false);
    custom_policy_level(&mut c, doc.policy_level.as_deref(), doc.custom_policy_level.as_deref());
    if let Some(base) = doc.described_base_url().filter(|b| !b.is_empty()) {
        c.matches("describedSystemInstance.baseUrl", base, &SYSTEM_INSTANCE_BASE_URL);
    }
    c
}

fn custom_policy_level(c: &mut FieldCheck, level: Option<&str>, custom: Option<&str>) {
    let Some(custom) = custom else {
        return;
    };
    if level != Some(POLICY_LEVEL_CUSTOM) {
        c.fail("customPolicyLevel", "is only allowed with policy level custom");
    }
    c.matches("customPolicyLevel", custom, &CUSTOM_TYPE);
}

// -- Shared pieces ------------------------------------------------------------

/// Tags, countries, line of business, industry, and labels. Line of business
/// and industry are restricted to the published lists for SAP namespaces that
/// are not under a custom policy.
fn classification(c: &mut FieldCheck, cls: &Classification, ord_id: &str, level: Option<&str>) {
    c.string_array("tags", cls.tags.as_ref(), &STRING_ARRAY_ELEMENT);
    c.string_array("countries", cls.countries.as_ref(), &COUNTRY);
    c.string_array("lineOfBusiness", cls.line_of_business.as_ref(), &STRING_ARRAY_ELEMENT);
    c.string_array("industry", cls.industry.as_ref(), &STRING_ARRAY_ELEMENT);
    if level != Some(POLICY_LEVEL_CUSTOM) && SAP_NAMESPACE.is_match(namespace_of(ord_id)) {
        c.allowed_items("lineOfBusiness", cls.line_of_business.as_ref(), LINES_OF_BUSINESS);
        c.allowed_items("industry", cls.industry.as_ref(), INDUSTRIES);
    }
    c.labels("labels", cls.labels.as_ref(), &LABEL_KEY);
}

/// Fields common to everything that lives in a package.
struct Packaged<'a> {
    ord_id: &'a str,
    id_pattern: &'a Regex,
    title: &'a str,
    version: &'a str,
    part_of_package: Option<&'a str>,
    visibility: Option<&'a str>,
    release_status: Option<&'a str>,
}

impl Packaged<'_> {
    fn check(&self, c: &mut FieldCheck) {
        c.matches("ordId", self.ord_id, self.id_pattern);
        c.required("title", self.title);
        c.matches("version", self.version, &SEMVER);
        c.matches("partOfPackage", self.part_of_package.unwrap_or_default(), &PACKAGE_ID);
        c.one_of("visibility", self.visibility, VISIBILITIES, true);
        c.one_of("releaseStatus", self.release_status, RELEASE_STATUSES, true);
    }
}

/// Deprecated resources announce a sunset date and successors.
fn deprecation(c: &mut FieldCheck, status: Option<&str>, sunset: Option<&str>, successors: Option<&Value>, pattern: &Regex) {
    c.date_time("sunsetDate", sunset);
    c.string_array("successors", successors, pattern);
    if status == Some(RELEASE_STATUS_DEPRECATED) {
        if sunset.map_or(true, str::is_empty) {
            c.fail("sunsetDate", "is required for deprecated resources");
        }
        if successors.is_none() {
            c.fail("successors", "is required for deprecated resources");
        }
    }
}

fn definitions(c: &mut FieldCheck, field: &str, defs: &[ResourceDefinition]) {
    for def in defs {
        if def.definition_type.is_empty() {
            c.fail(field, "every definition needs a type");
        } else if def.definition_type == "custom" {
            c.matches(field, def.custom_type.as_deref().unwrap_or_default(), &CUSTOM_TYPE);
        }
        if def.url.is_empty() {
            c.fail(field, "every definition needs a url");
        }
        if def.media_type.is_empty() {
            c.fail(field, "every definition needs a mediaType");
        }
    }
}

fn implementation_standard(
    c: &mut FieldCheck,
    standard: Option<&str>,
    custom: Option<&str>,
    custom_description: Option<&str>,
) {
    if standard == Some(IMPLEMENTATION_STANDARD_CUSTOM) {
        c.matches("customImplementationStandard", custom.unwrap_or_default(), &CUSTOM_TYPE);
        c.required_opt("customImplementationStandardDescription", custom_description);
    } else {
        if custom.is_some() {
            c.fail("customImplementationStandard", "requires implementation standard custom");
        }
        if custom_description.is_some() {
            c.fail("customImplementationStandardDescription", "requires implementation standard custom");
        }
    }
}

fn extensible(c: &mut FieldCheck, value: Option<&Value>, level: Option<&str>) {
    let Some(value) = value else {
        if is_sap_or_partner(level) {
            c.fail("extensible", "is required for this policy level");
        }
        return;
    };
    let Some(obj) = value.as_object() else {
        c.fail("extensible", "must be an object");
        return;
    };
    let supported = str_field(obj, "supported");
    c.one_of("extensible.supported", Some(supported), EXTENSIBLE_SUPPORT, true);
    if matches!(supported, "manual" | "automatic") && str_field(obj, "description").is_empty() {
        c.fail("extensible.description", "is required when extension is supported");
    }
}

fn bundle_references(
    c: &mut FieldCheck,
    refs: Option<&Vec<ConsumptionBundleReference>>,
    entry_points: Option<&[String]>,
) {
    let Some(refs) = refs else {
        return;
    };
    if refs.is_empty() {
        c.fail("partOfConsumptionBundles", "must not be empty");
    }
    let mut seen = HashSet::new();
    for reference in refs {
        c.matches("partOfConsumptionBundles.ordId", &reference.ord_id, &BUNDLE_ID);
        if !seen.insert(reference.ord_id.as_str()) {
            c.fail("partOfConsumptionBundles", format!("{:?} is referenced twice", reference.ord_id));
        }
        let Some(default) = &reference.default_entry_point else {
            continue;
        };
        match entry_points {
            None => c.fail("partOfConsumptionBundles.defaultEntryPoint", "is not allowed here"),
            Some(eps) if eps.len() < 2 => c.fail(
                "partOfConsumptionBundles.defaultEntryPoint",
                "requires more than one entry point",
            ),
            Some(eps) if !eps.contains(default) => c.fail(
                "partOfConsumptionBundles.defaultEntryPoint",
                format!("{default:?} is not one of the entry points"),
            ),
            Some(_) => {}
        }
    }
}

// -- Packages, bundles, products, vendors ---------------------------------------

fn check_package(pkg: &Package) -> FieldCheck {
    let mut c = FieldCheck::new(&pkg.ord_id);
    c.matches("ordId", &pkg.ord_id, &PACKAGE_ID);
    c.required("title", &pkg.title);
    c.short_text("shortDescription", pkg.short_description.as_deref());
    c.required_opt("description", pkg.description.as_deref());
    c.matches("version", &pkg.version, &SEMVER);

    let level = pkg.policy_level.as_deref();
    c.one_of("policyLevel", level, POLICY_LEVELS, true);
    custom_policy_level(&mut c, level, pkg.custom_policy_level.as_deref());

    c.links("packageLinks", pkg.package_links.as_ref(), Some(PACKAGE_LINK_TYPES));
    c.links("links", pkg.links.as_ref(), None);

    let vendor = pkg.vendor.as_deref().unwrap_or_default();
    c.matches("vendor", vendor, &VENDOR_ID);
    match level {
        Some(POLICY_LEVEL_SAP) if vendor != SAP_VENDOR => {
            c.fail("vendor", format!("must be {SAP_VENDOR} for policy level {POLICY_LEVEL_SAP}"))
        }
        Some(POLICY_LEVEL_SAP_PARTNER) if vendor == SAP_VENDOR => {
            c.fail("vendor", format!("must not be {SAP_VENDOR} for policy level {POLICY_LEVEL_SAP_PARTNER}"))
        }
        _ => {}
    }

    if pkg.classification.part_of_products.is_none() {
        c.fail("partOfProducts", "is required");
    }
    c.string_array("partOfProducts", pkg.classification.part_of_products.as_ref(), &PRODUCT_ID);
    classification(&mut c, &pkg.classification, &pkg.ord_id, level);
    c
}

fn check_bundle(bundle: &ConsumptionBundle) -> FieldCheck {
    let mut c = FieldCheck::new(&bundle.ord_id);
    c.matches("ordId", &bundle.ord_id, &BUNDLE_ID);
    c.required("title", &bundle.title);
    if bundle.short_description.is_some() {
        c.short_text("shortDescription", bundle.short_description.as_deref());
    }
    if bundle.description.is_some() {
        c.required_opt("description", bundle.description.as_deref());
    }
    c.links("links", bundle.links.as_ref(), None);
    c.labels("labels", bundle.labels.as_ref(), &LABEL_KEY);
    c.string_array("correlationIds", bundle.correlation_ids.as_ref(), &CORRELATION_ID);

    let field = "credentialExchangeStrategies";
    for strategy in c.objects(field, bundle.credential_exchange_strategies.as_ref()) {
        let strategy_type = str_field(strategy, "type");
        if strategy_type.is_empty() {
            c.fail(field, "every strategy needs a type");
            continue;
        }
        let custom = strategy_type == "custom";
        match strategy.get("customType").and_then(Value::as_str) {
            Some(t) if custom => c.matches(field, t, &CUSTOM_TYPE),
            Some(_) => c.fail(field, "customType requires type custom"),
            None if custom => c.fail(field, "custom strategies need a customType"),
            None => {}
        }
        if !custom && strategy.contains_key("customDescription") {
            c.fail(field, "customDescription requires type custom");
        }
        if strategy.contains_key("callbackUrl") && str_field(strategy, "callbackUrl").is_empty() {
            c.fail(field, "callbackUrl must not be empty");
        }
    }
    c
}

fn check_product(product: &Product) -> FieldCheck {
    let mut c = FieldCheck::new(&product.ord_id);
    c.matches("ordId", &product.ord_id, &PRODUCT_ID);
    c.required("title", &product.title);
    c.short_text("shortDescription", product.short_description.as_deref());
    c.matches("vendor", &product.vendor, &VENDOR_ID);
    let sap = SAP_NAMESPACE.is_match(namespace_of(&product.ord_id));
    if sap && product.vendor != SAP_VENDOR {
        c.fail("vendor", format!("products in an SAP namespace must use {SAP_VENDOR}"));
    } else if !sap && product.vendor == SAP_VENDOR {
        c.fail("vendor", format!("only SAP namespaces may use {SAP_VENDOR}"));
    }
    c.matches_if_present("parent", product.parent.as_deref(), &PRODUCT_ID);
    c.string_array("correlationIds", product.correlation_ids.as_ref(), &CORRELATION_ID);
    c.string_array("tags", product.tags.as_ref(), &STRING_ARRAY_ELEMENT);
    c.labels("labels", product.labels.as_ref(), &LABEL_KEY);
    c
}

fn check_vendor(vendor: &Vendor) -> FieldCheck {
    let mut c = FieldCheck::new(&vendor.ord_id);
    c.matches("ordId", &vendor.ord_id, &VENDOR_ID);
    c.required("title", &vendor.title);
    c.string_array("partners", vendor.partners.as_ref(), &VENDOR_ID);
    c.string_array("tags", vendor.tags.as_ref(), &STRING_ARRAY_ELEMENT);
    c.labels("labels", vendor.labels.as_ref(), &LABEL_KEY);
    c
}

// -- APIs and events ----------------------------------------------------------

fn check_api(api: &ApiResource, ctx: &RuleContext<'_>) -> FieldCheck {
    let mut c = FieldCheck::new(&api.ord_id);
    let level = ctx.policy_level(api.part_of_package.as_deref(), api.policy_level.as_deref());
    let visibility = api.visibility.as_deref();
    let status = api.release_status.as_deref();

    Packaged {
        ord_id: &api.ord_id,
        id_pattern: &API_ID,
        title: &api.title,
        version: &api.version,
        part_of_package: api.part_of_package.as_deref(),
        visibility,
        release_status: status,
    }
    .check(&mut c);
    c.short_text("shortDescription", api.short_description.as_deref());
    c.required_opt("description", api.description.as_deref());
    let protocol = api.api_protocol.as_deref();
    c.one_of("apiProtocol", protocol, API_PROTOCOLS, true);

    deprecation(&mut c, status, api.sunset_date.as_deref(), api.successors.as_ref(), &API_ID);
    c.changelog("changelogEntries", api.changelog_entries.as_ref(), &SEMVER, RELEASE_STATUSES);
    c.links("apiResourceLinks", api.api_resource_links.as_ref(), Some(API_LINK_TYPES));
    c.links("links", api.links.as_ref(), None);
    classification(&mut c, &api.classification, &api.ord_id, level);
    c.string_array("partOfProducts", api.classification.part_of_products.as_ref(), &PRODUCT_ID);

    let sap_private = level == Some(POLICY_LEVEL_SAP) && visibility == Some(VISIBILITY_PRIVATE);
    if api.resource_definitions.is_empty() {
        if !sap_private {
            c.fail("resourceDefinitions", "is required");
        }
    } else {
        definitions(&mut c, "resourceDefinitions", &api.resource_definitions);
        if is_sap_or_partner(level) {
            protocol_definitions(&mut c, protocol, &api.resource_definitions);
        }
    }

    let entry_points = match &api.entry_points {
        Some(value) => c.unique_strings("entryPoints", Some(value)),
        None => Vec::new(),
    };
    if entry_points.is_empty() && api.part_of_consumption_bundles.as_ref().is_some_and(|r| !r.is_empty()) {
        c.fail("partOfConsumptionBundles", "requires entry points");
    }
    bundle_references(&mut c, api.part_of_consumption_bundles.as_ref(), Some(entry_points.as_slice()));

    c.one_of(
        "implementationStandard",
        api.implementation_standard.as_deref(),
        API_IMPLEMENTATION_STANDARDS,
        false,
    );
    implementation_standard(
        &mut c,
        api.implementation_standard.as_deref(),
        api.custom_implementation_standard.as_deref(),
        api.custom_implementation_standard_description.as_deref(),
    );
    extensible(&mut c, api.extensible.as_ref(), level);
    c
}

/// Definition types each protocol must ship under the SAP policy levels.
fn protocol_definitions(c: &mut FieldCheck, protocol: Option<&str>, defs: &[ResourceDefinition]) {
    fn has(defs: &[ResourceDefinition], types: &[&str]) -> bool {
        defs.iter().any(|d| types.contains(&d.definition_type.as_str()))
    }
    const OPENAPI: &[&str] = &["openapi-v2", "openapi-v3"];
    let missing = match protocol {
        Some("soap-inbound" | "soap-outbound") if !has(defs, &["wsdl-v1", "wsdl-v2"]) => Some("a WSDL definition"),
        Some("odata-v2" | "odata-v4") if !has(defs, &["edmx"]) || !has(defs, OPENAPI) => {
            Some("EDMX and OpenAPI definitions")
        }
        Some("rest") if !has(defs, OPENAPI) => Some("an OpenAPI definition"),
        Some("sap-rfc") if !has(defs, &["sap-rfc-metadata"]) => Some("an RFC metadata definition"),
        _ => None,
    };
    if let Some(missing) = missing {
        c.fail("resourceDefinitions", format!("protocol {} requires {missing}", protocol.unwrap_or_default()));
    }
}

fn check_event(event: &EventResource, ctx: &RuleContext<'_>) -> FieldCheck {
    let mut c = FieldCheck::new(&event.ord_id);
    let level = ctx.policy_level(event.part_of_package.as_deref(), event.policy_level.as_deref());
    let visibility = event.visibility.as_deref();
    let status = event.release_status.as_deref();

    Packaged {
        ord_id: &event.ord_id,
        id_pattern: &EVENT_ID,
        title: &event.title,
        version: &event.version,
        part_of_package: event.part_of_package.as_deref(),
        visibility,
        release_status: status,
    }
    .check(&mut c);
    c.short_text("shortDescription", event.short_description.as_deref());
    c.required_opt("description", event.description.as_deref());

    deprecation(&mut c, status, event.sunset_date.as_deref(), event.successors.as_ref(), &EVENT_ID);
    c.changelog("changelogEntries", event.changelog_entries.as_ref(), &SEMVER, RELEASE_STATUSES);
    c.links("eventResourceLinks", event.event_resource_links.as_ref(), Some(API_LINK_TYPES));
    c.links("links", event.links.as_ref(), None);
    classification(&mut c, &event.classification, &event.ord_id, level);
    c.string_array("partOfProducts", event.classification.part_of_products.as_ref(), &PRODUCT_ID);

    let sap_private = level == Some(POLICY_LEVEL_SAP) && visibility == Some(VISIBILITY_PRIVATE);
    if event.resource_definitions.is_empty() && !sap_private {
        c.fail("resourceDefinitions", "is required");
    }
    definitions(&mut c, "resourceDefinitions", &event.resource_definitions);
    bundle_references(&mut c, event.part_of_consumption_bundles.as_ref(), None);
    implementation_standard(
        &mut c,
        event.implementation_standard.as_deref(),
        event.custom_implementation_standard.as_deref(),
        event.custom_implementation_standard_description.as_deref(),
    );
    extensible(&mut c, event.extensible.as_ref(), level);
    c
}

// -- Newer resource kinds -----------------------------------------------------

fn check_entity_type(entity: &EntityType, ctx: &RuleContext<'_>) -> FieldCheck {
    let mut c = FieldCheck::new(&entity.ord_id);
    let level = ctx.policy_level(entity.part_of_package.as_deref(), entity.policy_level.as_deref());
    let status = entity.release_status.as_deref();
    Packaged {
        ord_id: &entity.ord_id,
        id_pattern: &ENTITY_TYPE_ID,
        title: &entity.title,
        version: &entity.version,
        part_of_package: entity.part_of_package.as_deref(),
        visibility: entity.visibility.as_deref(),
        release_status: status,
    }
    .check(&mut c);
    c.required_opt("localId", entity.local_id.as_deref());
    deprecation(&mut c, status, entity.sunset_date.as_deref(), entity.successors.as_ref(), &ENTITY_TYPE_ID);
    c.changelog("changelogEntries", entity.changelog_entries.as_ref(), &SEMVER, RELEASE_STATUSES);
    c.links("links", entity.links.as_ref(), None);
    classification(&mut c, &entity.classification, &entity.ord_id, level);
    if entity.extensible.is_some() {
        extensible(&mut c, entity.extensible.as_ref(), level);
    }
    c
}

fn check_capability(cap: &Capability, ctx: &RuleContext<'_>) -> FieldCheck {
    let mut c = FieldCheck::new(&cap.ord_id);
    let level = ctx.policy_level(cap.part_of_package.as_deref(), cap.policy_level.as_deref());
    Packaged {
        ord_id: &cap.ord_id,
        id_pattern: &CAPABILITY_ID,
        title: &cap.title,
        version: &cap.version,
        part_of_package: cap.part_of_package.as_deref(),
        visibility: cap.visibility.as_deref(),
        release_status: cap.release_status.as_deref(),
    }
    .check(&mut c);
    let cap_type = cap.capability_type.as_deref();
    c.one_of("type", cap_type, CAPABILITY_TYPES, true);
    match (cap_type, cap.custom_type.as_deref()) {
        (Some("custom"), custom) => c.matches("customType", custom.unwrap_or_default(), &CUSTOM_TYPE),
        (_, Some(_)) => c.fail("customType", "requires type custom"),
        _ => {}
    }
    definitions(&mut c, "definitions", &cap.definitions);
    c.links("links", cap.links.as_ref(), None);
    classification(&mut c, &cap.classification, &cap.ord_id, level);
    c
}

fn check_integration_dependency(dep: &IntegrationDependency, ctx: &RuleContext<'_>) -> FieldCheck {
    let mut c = FieldCheck::new(&dep.ord_id);
    let level = ctx.policy_level(dep.part_of_package.as_deref(), dep.policy_level.as_deref());
    Packaged {
        ord_id: &dep.ord_id,
        id_pattern: &INTEGRATION_DEPENDENCY_ID,
        title: &dep.title,
        version: &dep.version,
        part_of_package: dep.part_of_package.as_deref(),
        visibility: dep.visibility.as_deref(),
        release_status: dep.release_status.as_deref(),
    }
    .check(&mut c);
    if dep.mandatory.is_none() {
        c.fail("mandatory", "is required");
    }
    if dep.aspects.is_none() {
        c.fail("aspects", "is required");
    }
    for aspect in c.objects("aspects", dep.aspects.as_ref()) {
        if str_field(aspect, "title").is_empty() {
            c.fail("aspects", "every aspect needs a title");
        }
    }
    c.links("links", dep.links.as_ref(), None);
    classification(&mut c, &dep.classification, &dep.ord_id, level);
    c
}

fn check_data_product(dp: &DataProduct, ctx: &RuleContext<'_>) -> FieldCheck {
    let mut c = FieldCheck::new(&dp.ord_id);
    let level = ctx.policy_level(dp.part_of_package.as_deref(), dp.policy_level.as_deref());
    Packaged {
        ord_id: &dp.ord_id,
        id_pattern: &DATA_PRODUCT_ID,
        title: &dp.title,
        version: &dp.version,
        part_of_package: dp.part_of_package.as_deref(),
        visibility: dp.visibility.as_deref(),
        release_status: dp.release_status.as_deref(),
    }
    .check(&mut c);
    c.short_text("shortDescription", dp.short_description.as_deref());
    c.one_of("type", dp.product_type.as_deref(), DATA_PRODUCT_TYPES, true);
    c.one_of("category", dp.category.as_deref(), DATA_PRODUCT_CATEGORIES, true);
    if dp.output_ports.is_none() {
        c.fail("outputPorts", "is required");
    }
    for port in c.objects("outputPorts", dp.output_ports.as_ref()) {
        if str_field(port, "ordId").is_empty() {
            c.fail("outputPorts", "every port needs an ordId");
        }
    }
    for link in c.objects("dataProductLinks", dp.data_product_links.as_ref()) {
        if str_field(link, "type").is_empty() || str_field(link, "url").is_empty() {
            c.fail("dataProductLinks", "every link needs a type and a url");
        }
    }
    c.changelog("changelogEntries", dp.changelog_entries.as_ref(), &SEMVER, RELEASE_STATUSES);
    c.links("links", dp.links.as_ref(), None);
    classification(&mut c, &dp.classification, &dp.ord_id, level);
    c
}

fn check_tombstone(tombstone: &Tombstone) -> FieldCheck {
    let mut c = FieldCheck::new(&tombstone.ord_id);
    c.matches("ordId", &tombstone.ord_id, &TOMBSTONE_ID);
    if c.required("removalDate", &tombstone.removal_date) {
        c.date_time("removalDate", Some(&tombstone.removal_date));
    }
    c
}

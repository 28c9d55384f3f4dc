//! SPDX package ⇄ `CycloneDX` component conversion.
//!
//! Field-level work is driven by the tables in [`super::fields`]; this module
//! owns the parts a table cannot express: identifier resolution, component
//! type inference, and the required-name check.

use super::fields::{
    expect_array, expect_str, json_type, FieldError, FieldMapping, FieldTable, FieldTransform,
    COMPONENT_FIELDS, PACKAGE_FIELDS,
};
use super::hash::HashAlgorithmTransformer;
use super::identifiers::IdentifierTransformer;
use super::license::{LicenseTransformer, NOASSERTION};
use super::party::{entity_name_email, format_party, Party, PartyKind};
use crate::config::EntityConfig;
use crate::model::{ConversionError, Diagnostics, Entity, Outcome};
use packageurl::PackageUrl;
use rayon::prelude::*;
use serde_json::{json, Value};
use std::borrow::Borrow;
use std::str::FromStr;

/// Which kind of entity is being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// SPDX package, converted to a `CycloneDX` component
    Package,
    /// `CycloneDX` component, converted to an SPDX package
    Component,
}

impl EntityKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Package => "Package",
            Self::Component => "Component",
        }
    }
}

/// `primaryPackagePurpose` ⇄ component `type`.
const PURPOSE_TYPES: &[(&str, &str)] = &[
    ("APPLICATION", "application"),
    ("FRAMEWORK", "framework"),
    ("LIBRARY", "library"),
    ("CONTAINER", "container"),
    ("OPERATING-SYSTEM", "operating-system"),
    ("DEVICE", "device"),
    ("FIRMWARE", "firmware"),
    ("FILE", "file"),
];

const DEFAULT_COMPONENT_TYPE: &str = "library";

/// Heuristic promoting a package from the default `library` type.
struct TypeRule {
    component_type: &'static str,
    name_suffixes: &'static [&'static str],
    name_substrings: &'static [&'static str],
    comment_keywords: &'static [&'static str],
}

impl TypeRule {
    fn matches(&self, name: &str, comment: &str) -> bool {
        self.name_suffixes.iter().any(|s| name.ends_with(s))
            || self.name_substrings.iter().any(|s| name.contains(s))
            || self.comment_keywords.iter().any(|k| comment.contains(k))
    }
}

/// Evaluated in order; the first match wins.
const TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        component_type: "application",
        name_suffixes: &["-app", "-cli", "-server", ".exe"],
        name_substrings: &[],
        comment_keywords: &["application", "executable"],
    },
    TypeRule {
        component_type: "framework",
        name_suffixes: &[],
        name_substrings: &["framework"],
        comment_keywords: &["framework"],
    },
    TypeRule {
        component_type: "operating-system",
        name_suffixes: &["-os"],
        name_substrings: &["linux", "ubuntu", "debian", "alpine"],
        comment_keywords: &["operating system"],
    },
];

/// Converts packages and components using the declarative field tables.
#[derive(Debug, Clone)]
pub struct EntityTransformer {
    packages: FieldTable,
    components: FieldTable,
    parallel_threshold: usize,
}

impl Default for EntityTransformer {
    fn default() -> Self {
        Self::new(&EntityConfig::default())
    }
}

impl EntityTransformer {
    #[must_use]
    pub fn new(config: &EntityConfig) -> Self {
        Self {
            packages: FieldTable::new(PACKAGE_FIELDS),
            components: FieldTable::new(COMPONENT_FIELDS),
            parallel_threshold: config.parallel_threshold.max(1),
        }
    }

    /// Mapping table for entities of `kind`.
    #[must_use]
    pub fn table(&self, kind: EntityKind) -> &FieldTable {
        match kind {
            EntityKind::Package => &self.packages,
            EntityKind::Component => &self.components,
        }
    }

    /// Convert one entity. Nested components are left to the caller.
    pub fn transform_one(&self, kind: EntityKind, source: &Entity) -> Outcome<Entity> {
        match kind {
            EntityKind::Package => self.package_to_component(source),
            EntityKind::Component => self.component_to_package(source),
        }
    }

    /// Convert a list of entities, keeping input order.
    ///
    /// Items that are not JSON objects are skipped with a warning. Lists at
    /// or above the configured threshold are converted on the rayon pool;
    /// diagnostics are still merged in input order.
    pub fn transform_many<V>(&self, kind: EntityKind, items: &[V]) -> Outcome<Vec<Entity>>
    where
        V: Borrow<Value> + Sync,
    {
        let convert = |(index, item): (usize, &V)| -> Outcome<Option<Entity>> {
            match Borrow::<Value>::borrow(item).as_object() {
                Some(entity) => self.transform_one(kind, entity).map(Some),
                None => {
                    let mut diagnostics = Diagnostics::new();
                    diagnostics.warn(format!(
                        "{} at index {index} is not an object; skipped",
                        kind.label()
                    ));
                    Outcome::new(None, diagnostics)
                }
            }
        };

        let results: Vec<Outcome<Option<Entity>>> = if items.len() >= self.parallel_threshold {
            tracing::debug!(count = items.len(), kind = kind.label(), "Converting entities in parallel");
            items.par_iter().enumerate().map(convert).collect()
        } else {
            items.iter().enumerate().map(convert).collect()
        };

        let mut outcome = Outcome::clean(Vec::with_capacity(results.len()));
        for result in results {
            if let Some(entity) = outcome.diagnostics.absorb(result) {
                outcome.value.push(entity);
            }
        }
        outcome
    }

    /// Component `type` for a package.
    ///
    /// An explicit `primaryPackagePurpose` wins. Otherwise the package is a
    /// `library` unless a name or comment heuristic says otherwise.
    #[must_use]
    pub fn infer_component_type(package: &Entity) -> &'static str {
        if let Some(purpose) = str_field(package, "primaryPackagePurpose") {
            let purpose = purpose.replace('_', "-");
            if let Some((_, component_type)) = PURPOSE_TYPES
                .iter()
                .find(|(p, _)| p.eq_ignore_ascii_case(&purpose))
            {
                return *component_type;
            }
        }

        let name = str_field(package, "name").unwrap_or_default().to_lowercase();
        let comment = str_field(package, "comment")
            .unwrap_or_default()
            .to_lowercase();
        TYPE_RULES
            .iter()
            .find(|rule| rule.matches(&name, &comment))
            .map_or(DEFAULT_COMPONENT_TYPE, |rule| rule.component_type)
    }

    /// `bom-ref` for a package: its SPDXID without prefix, else its purl,
    /// else name/version with a random suffix, else a generated reference.
    pub fn component_reference(package: &Entity) -> Outcome<String> {
        if let Some(id) = str_field(package, "SPDXID") {
            return Outcome::clean(IdentifierTransformer::strip_prefix(id).to_string());
        }

        let reference = if let Some(purl) = package_purl(package) {
            purl.to_string()
        } else if let Some(name) = str_field(package, "name") {
            name_reference(name, str_field(package, "versionInfo"))
        } else {
            IdentifierTransformer::generate_reference(Some("component-"))
        };

        let mut diagnostics = Diagnostics::new();
        diagnostics.warn(format!(
            "Package has no SPDXID; using generated reference '{reference}'"
        ));
        Outcome::new(reference, diagnostics)
    }

    /// SPDXID for a component: its `bom-ref`, else its purl, else
    /// name/version with a random suffix, all formatted as SPDX ids.
    #[must_use]
    pub fn package_identifier(component: &Entity) -> String {
        if let Some(reference) = str_field(component, "bom-ref") {
            IdentifierTransformer::format_as_id(reference)
        } else if let Some(purl) = str_field(component, "purl") {
            IdentifierTransformer::format_as_id(purl)
        } else if let Some(name) = str_field(component, "name") {
            IdentifierTransformer::format_as_id(&name_reference(
                name,
                str_field(component, "version"),
            ))
        } else {
            IdentifierTransformer::generate_reference(Some("SPDXRef-Package-"))
        }
    }

    fn package_to_component(&self, package: &Entity) -> Outcome<Entity> {
        let mut diagnostics = Diagnostics::new();
        let mut component = Entity::new();

        component.insert(
            "type".to_string(),
            json!(Self::infer_component_type(package)),
        );
        let reference = diagnostics.absorb(Self::component_reference(package));
        component.insert("bom-ref".to_string(), json!(reference));

        diagnostics.merge(self.apply_table(EntityKind::Package, package, &mut component, &reference));
        diagnostics.merge(ensure_name(EntityKind::Package, &mut component, &reference));
        Outcome::new(component, diagnostics)
    }

    fn component_to_package(&self, component: &Entity) -> Outcome<Entity> {
        let mut diagnostics = Diagnostics::new();
        let mut package = Entity::new();

        let id = Self::package_identifier(component);
        package.insert("SPDXID".to_string(), json!(id));

        diagnostics.merge(self.apply_table(EntityKind::Component, component, &mut package, &id));
        diagnostics.merge(ensure_name(EntityKind::Component, &mut package, &id));

        LicenseTransformer::add_if_absent(&mut package, "downloadLocation", json!(NOASSERTION));
        LicenseTransformer::add_if_absent(&mut package, "filesAnalyzed", json!(false));
        Outcome::new(package, diagnostics)
    }

    /// Walk the table for `kind`, then report source fields it does not list.
    fn apply_table(
        &self,
        kind: EntityKind,
        source: &Entity,
        target: &mut Entity,
        label: &str,
    ) -> Diagnostics {
        let table = self.table(kind);
        let mut diagnostics = Diagnostics::new();

        for mapping in table.iter() {
            let Some(value) = source.get(mapping.source).filter(|v| !v.is_null()) else {
                continue;
            };
            match apply_mapping(mapping, value, target) {
                Ok(produced) => diagnostics.merge(produced),
                Err(err) => {
                    tracing::debug!(field = mapping.source, entity = label, "Field mapping failed: {err}");
                    let message = format!("{} '{label}': {err}", kind.label());
                    diagnostics.error(
                        ConversionError::field(mapping.source, message)
                            .with_origin(mapping.transform.origin())
                            .with_context("entity", label)
                            .with_cause(err),
                    );
                }
            }
        }

        for key in source.keys().filter(|key| !table.contains(key)) {
            diagnostics.warn(format!(
                "Unmapped field '{key}' on {} '{label}' dropped",
                kind.label().to_lowercase()
            ));
        }
        diagnostics
    }
}

/// Run one table entry. A wrong-typed source value is the only hard failure.
fn apply_mapping(
    mapping: &FieldMapping,
    value: &Value,
    target: &mut Entity,
) -> Result<Diagnostics, FieldError> {
    let mut diagnostics = Diagnostics::new();
    let field = mapping.source;

    match mapping.transform {
        FieldTransform::Identifier => {
            expect_str(field, value)?;
        }
        FieldTransform::Consumed => {}
        FieldTransform::Rename => {
            target.insert(mapping.target.to_string(), value.clone());
        }
        FieldTransform::RenameAsserted => {
            if !value.as_str().is_some_and(LicenseTransformer::is_sentinel) {
                target.insert(mapping.target.to_string(), value.clone());
            }
        }
        FieldTransform::ChecksumsToHashes | FieldTransform::HashesToChecksums => {
            let entries = expect_array(field, value)?;
            let converted = if mapping.transform == FieldTransform::ChecksumsToHashes {
                HashAlgorithmTransformer::convert_list_forward(entries)
            } else {
                HashAlgorithmTransformer::convert_list_backward(entries)
            };
            let converted = diagnostics.absorb(converted);
            if !converted.is_empty() {
                target.insert(mapping.target.to_string(), Value::Array(converted));
            }
        }
        FieldTransform::LicenseToList => {
            let licenses = LicenseTransformer::transform_forward(expect_str(field, value)?);
            if !licenses.is_empty() {
                target.insert(mapping.target.to_string(), Value::Array(licenses));
            }
        }
        FieldTransform::LicenseToListIfAbsent => {
            let licenses = LicenseTransformer::transform_forward(expect_str(field, value)?);
            if !licenses.is_empty() {
                LicenseTransformer::add_if_absent(target, mapping.target, Value::Array(licenses));
            }
        }
        FieldTransform::LicenseListToString { secondary } => {
            let entries = expect_array(field, value)?;
            let expression = diagnostics.absorb(LicenseTransformer::transform_backward(entries));
            LicenseTransformer::add_dual(target, mapping.target, secondary, &expression);
        }
        FieldTransform::PartyToSupplier => {
            if let Some(party) = Party::parse(expect_str(field, value)?) {
                target.insert(mapping.target.to_string(), party.to_organization());
            }
        }
        FieldTransform::PartyToAuthor => {
            if let Some(party) = Party::parse(expect_str(field, value)?) {
                target.insert(mapping.target.to_string(), json!(party.name));
            }
        }
        FieldTransform::SupplierToParty => {
            if !value.is_object() {
                return Err(unexpected(field, "an object", value));
            }
            match entity_name_email(value) {
                Some((name, email)) => {
                    let party = format_party(PartyKind::Organization, name, email);
                    target.insert(mapping.target.to_string(), json!(party));
                }
                None => diagnostics.warn(format!("Field '{field}' has no name; dropped")),
            }
        }
        FieldTransform::AuthorToParty => {
            let author = expect_str(field, value)?.trim();
            if !author.is_empty() {
                let party = format_party(PartyKind::Person, author, None);
                target.insert(mapping.target.to_string(), json!(party));
            }
        }
        FieldTransform::ExternalRefsToComponent => {
            let refs = expect_array(field, value)?;
            diagnostics.merge(external_refs_to_component(refs, mapping.target, target));
        }
        FieldTransform::PurlToExternalRef => {
            let purl = expect_str(field, value)?;
            push_entry(
                target,
                mapping.target,
                spdx_external_ref("PACKAGE-MANAGER", "purl", purl),
            );
        }
        FieldTransform::CpeToExternalRef => {
            let cpe = expect_str(field, value)?;
            let reference_type = if cpe.starts_with("cpe:2.3:") {
                "cpe23Type"
            } else {
                "cpe22Type"
            };
            push_entry(
                target,
                mapping.target,
                spdx_external_ref("SECURITY", reference_type, cpe),
            );
        }
        FieldTransform::UrlToReference { reference_type } => {
            let url = expect_str(field, value)?;
            if !LicenseTransformer::is_sentinel(url) {
                push_entry(target, mapping.target, cdx_reference(reference_type, url, None));
            }
        }
        FieldTransform::ReferencesToPackage => {
            let references = expect_array(field, value)?;
            diagnostics.merge(references_to_package(references, target));
        }
        FieldTransform::TypeToPurpose => {
            let component_type = expect_str(field, value)?;
            let purpose = match PURPOSE_TYPES.iter().find(|(_, t)| *t == component_type) {
                Some((purpose, _)) => *purpose,
                None => {
                    diagnostics.warn(format!(
                        "Component type '{component_type}' has no SPDX package purpose; using OTHER"
                    ));
                    "OTHER"
                }
            };
            target.insert(mapping.target.to_string(), json!(purpose));
        }
    }
    Ok(diagnostics)
}

/// SPDX `externalRefs` → `purl`, `cpe`, and `externalReferences` entries.
///
/// The first valid purl and first CPE become the component's own fields;
/// everything else is kept as an external reference.
fn external_refs_to_component(refs: &[Value], field: &str, target: &mut Entity) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    for (index, entry) in refs.iter().enumerate() {
        let reference_type = entry.get("referenceType").and_then(Value::as_str);
        let locator = entry.get("referenceLocator").and_then(Value::as_str);
        let (Some(reference_type), Some(locator)) = (reference_type, locator) else {
            diagnostics.warn(format!(
                "External reference {index} missing referenceType or referenceLocator; skipped"
            ));
            continue;
        };

        match reference_type {
            "purl" => match PackageUrl::from_str(locator) {
                Ok(_) if !target.contains_key("purl") => {
                    target.insert("purl".to_string(), json!(locator));
                }
                Ok(_) => push_entry(target, field, cdx_reference("other", locator, Some("purl"))),
                Err(err) => {
                    diagnostics.warn(format!(
                        "Invalid package URL '{locator}': {err}; kept as external reference"
                    ));
                    push_entry(target, field, cdx_reference("other", locator, Some("purl")));
                }
            },
            "cpe23Type" | "cpe22Type" if !target.contains_key("cpe") => {
                target.insert("cpe".to_string(), json!(locator));
            }
            "advisory" => push_entry(target, field, cdx_reference("advisories", locator, None)),
            other => push_entry(target, field, cdx_reference("other", locator, Some(other))),
        }
    }
    diagnostics
}

/// `CycloneDX` `externalReferences` → SPDX URL fields and `externalRefs`.
fn references_to_package(references: &[Value], target: &mut Entity) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    for (index, entry) in references.iter().enumerate() {
        let reference_type = entry.get("type").and_then(Value::as_str);
        let url = entry.get("url").and_then(Value::as_str);
        let (Some(reference_type), Some(url)) = (reference_type, url) else {
            diagnostics.warn(format!(
                "External reference {index} missing type or url; skipped"
            ));
            continue;
        };

        let placed = match reference_type {
            "website" => LicenseTransformer::add_if_absent(target, "homepage", json!(url)),
            "distribution" => {
                LicenseTransformer::add_if_absent(target, "downloadLocation", json!(url))
            }
            _ => false,
        };
        if placed {
            continue;
        }

        let external_ref = match (reference_type, entry.get("comment").and_then(Value::as_str)) {
            ("advisories", _) => spdx_external_ref("SECURITY", "advisory", url),
            ("other", Some("purl")) => spdx_external_ref("PACKAGE-MANAGER", "purl", url),
            ("other", Some(original)) => spdx_external_ref("OTHER", original, url),
            (other, _) => spdx_external_ref("OTHER", other, url),
        };
        push_entry(target, "externalRefs", external_ref);
    }
    diagnostics
}

fn spdx_external_ref(category: &str, reference_type: &str, locator: &str) -> Value {
    json!({
        "referenceCategory": category,
        "referenceType": reference_type,
        "referenceLocator": locator,
    })
}

fn cdx_reference(reference_type: &str, url: &str, comment: Option<&str>) -> Value {
    match comment {
        Some(comment) => json!({ "type": reference_type, "url": url, "comment": comment }),
        None => json!({ "type": reference_type, "url": url }),
    }
}

/// Append to the array at `field`, creating it if needed.
fn push_entry(target: &mut Entity, field: &str, entry: Value) {
    let slot = target
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    match slot {
        Value::Array(items) => items.push(entry),
        other => *other = Value::Array(vec![entry]),
    }
}

/// Give the entity a placeholder name if it has none.
fn ensure_name(kind: EntityKind, entity: &mut Entity, label: &str) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    if str_field(entity, "name").is_some_and(|name| !name.trim().is_empty()) {
        return diagnostics;
    }
    let placeholder = format!("unknown-{}", IdentifierTransformer::short_suffix());
    diagnostics.warn(format!(
        "{} '{label}' missing required field: name; using '{placeholder}'",
        kind.label()
    ));
    entity.insert("name".to_string(), json!(placeholder));
    diagnostics
}

fn unexpected(field: &str, expected: &'static str, value: &Value) -> FieldError {
    FieldError::UnexpectedType {
        field: field.to_string(),
        expected,
        found: json_type(value),
    }
}

fn str_field<'a>(entity: &'a Entity, field: &str) -> Option<&'a str> {
    entity
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// First purl locator among a package's `externalRefs`.
fn package_purl(package: &Entity) -> Option<&str> {
    package
        .get("externalRefs")?
        .as_array()?
        .iter()
        .filter(|r| r.get("referenceType").and_then(Value::as_str) == Some("purl"))
        .find_map(|r| r.get("referenceLocator").and_then(Value::as_str))
}

fn name_reference(name: &str, version: Option<&str>) -> String {
    let suffix = IdentifierTransformer::short_suffix();
    match version {
        Some(version) => format!("{name}-{version}-{suffix}"),
        None => format!("{name}-{suffix}"),
    }
}

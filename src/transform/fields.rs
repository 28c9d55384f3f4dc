//! Declarative field-mapping tables for packages and components.
//!
//! Each table is ordered configuration data: source field, target field,
//! and one of a closed set of [`FieldTransform`] operations. The entity
//! transformer walks the table in order and dispatches on the variant, so
//! adding a mapping never means adding a branch somewhere else. Fields a
//! table does not list are reported and dropped.

use crate::model::Origin;
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Every operation a table entry can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTransform {
    /// Element identifier; resolved before the table runs
    Identifier,
    /// Copy the value under the target name
    Rename,
    /// Copy unless the value is an SPDX `NOASSERTION`/`NONE` sentinel
    RenameAsserted,
    /// SPDX `checksums` → `CycloneDX` `hashes`
    ChecksumsToHashes,
    /// `CycloneDX` `hashes` → SPDX `checksums`
    HashesToChecksums,
    /// License expression string → license list
    LicenseToList,
    /// License expression string → license list, unless one is already set
    LicenseToListIfAbsent,
    /// License list → expression string, also filling `secondary` if unset
    LicenseListToString { secondary: &'static str },
    /// `Organization: X` → `{"name": "X"}`
    PartyToSupplier,
    /// `{"name": "X"}` → `Organization: X`
    SupplierToParty,
    /// `Person: X` → `X`
    PartyToAuthor,
    /// `X` → `Person: X`
    AuthorToParty,
    /// SPDX `externalRefs` → `purl`, `cpe`, and `externalReferences`
    ExternalRefsToComponent,
    /// `purl` → SPDX `PACKAGE-MANAGER` external ref
    PurlToExternalRef,
    /// `cpe` → SPDX `SECURITY` external ref
    CpeToExternalRef,
    /// URL field → `externalReferences` entry of the given type
    UrlToReference { reference_type: &'static str },
    /// `externalReferences` → `homepage`, `downloadLocation`, `externalRefs`
    ReferencesToPackage,
    /// `CycloneDX` `type` → SPDX `primaryPackagePurpose`
    TypeToPurpose,
    /// Known field read by another step (or deliberately not carried)
    Consumed,
}

impl FieldTransform {
    /// The engine part a failure of this transform is attributed to.
    #[must_use]
    pub const fn origin(self) -> Origin {
        match self {
            Self::Identifier => Origin::Identifier,
            Self::ChecksumsToHashes | Self::HashesToChecksums => Origin::Hash,
            Self::LicenseToList | Self::LicenseToListIfAbsent | Self::LicenseListToString { .. } => {
                Origin::License
            }
            Self::PartyToSupplier
            | Self::SupplierToParty
            | Self::PartyToAuthor
            | Self::AuthorToParty
            | Self::ExternalRefsToComponent
            | Self::PurlToExternalRef
            | Self::CpeToExternalRef
            | Self::UrlToReference { .. }
            | Self::ReferencesToPackage
            | Self::TypeToPurpose => Origin::Entity,
            Self::Rename | Self::RenameAsserted | Self::Consumed => Origin::FieldMapping,
        }
    }
}

/// One row of a mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub source: &'static str,
    pub target: &'static str,
    pub transform: FieldTransform,
}

const fn map(source: &'static str, target: &'static str, transform: FieldTransform) -> FieldMapping {
    FieldMapping {
        source,
        target,
        transform,
    }
}

/// SPDX package → `CycloneDX` component.
pub const PACKAGE_FIELDS: &[FieldMapping] = &[
    map("SPDXID", "bom-ref", FieldTransform::Identifier),
    map("name", "name", FieldTransform::Rename),
    map("versionInfo", "version", FieldTransform::RenameAsserted),
    map("description", "description", FieldTransform::Rename),
    map("supplier", "supplier", FieldTransform::PartyToSupplier),
    map("originator", "author", FieldTransform::PartyToAuthor),
    map("copyrightText", "copyright", FieldTransform::RenameAsserted),
    map("checksums", "hashes", FieldTransform::ChecksumsToHashes),
    map("licenseConcluded", "licenses", FieldTransform::LicenseToList),
    map("licenseDeclared", "licenses", FieldTransform::LicenseToListIfAbsent),
    map(
        "externalRefs",
        "externalReferences",
        FieldTransform::ExternalRefsToComponent,
    ),
    map(
        "homepage",
        "externalReferences",
        FieldTransform::UrlToReference {
            reference_type: "website",
        },
    ),
    map(
        "downloadLocation",
        "externalReferences",
        FieldTransform::UrlToReference {
            reference_type: "distribution",
        },
    ),
    map("primaryPackagePurpose", "type", FieldTransform::Consumed),
    map("comment", "type", FieldTransform::Consumed),
    map("filesAnalyzed", "", FieldTransform::Consumed),
    map("packageVerificationCode", "", FieldTransform::Consumed),
    map("hasFiles", "", FieldTransform::Consumed),
];

/// `CycloneDX` component → SPDX package.
pub const COMPONENT_FIELDS: &[FieldMapping] = &[
    map("bom-ref", "SPDXID", FieldTransform::Identifier),
    map("name", "name", FieldTransform::Rename),
    map("version", "versionInfo", FieldTransform::Rename),
    map("description", "description", FieldTransform::Rename),
    map("supplier", "supplier", FieldTransform::SupplierToParty),
    map("author", "originator", FieldTransform::AuthorToParty),
    map("copyright", "copyrightText", FieldTransform::Rename),
    map("hashes", "checksums", FieldTransform::HashesToChecksums),
    map(
        "licenses",
        "licenseConcluded",
        FieldTransform::LicenseListToString {
            secondary: "licenseDeclared",
        },
    ),
    map("purl", "externalRefs", FieldTransform::PurlToExternalRef),
    map("cpe", "externalRefs", FieldTransform::CpeToExternalRef),
    map(
        "externalReferences",
        "homepage",
        FieldTransform::ReferencesToPackage,
    ),
    map("type", "primaryPackagePurpose", FieldTransform::TypeToPurpose),
    map("components", "", FieldTransform::Consumed),
];

/// A mapping table with a by-source-field index built once.
#[derive(Debug, Clone)]
pub struct FieldTable {
    entries: IndexMap<&'static str, FieldMapping>,
}

impl FieldTable {
    #[must_use]
    pub fn new(mappings: &'static [FieldMapping]) -> Self {
        let entries = mappings.iter().map(|m| (m.source, *m)).collect();
        Self { entries }
    }

    /// Mappings in table order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.entries.values()
    }

    #[must_use]
    pub fn get(&self, source: &str) -> Option<&FieldMapping> {
        self.entries.get(source)
    }

    #[must_use]
    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    /// Target field of the identifier mapping.
    #[must_use]
    pub fn identifier_field(&self) -> Option<(&'static str, &'static str)> {
        self.iter()
            .find(|m| m.transform == FieldTransform::Identifier)
            .map(|m| (m.source, m.target))
    }
}

/// A single field could not be transformed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("field '{field}' should be {expected}, found {found}")]
    UnexpectedType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// JSON type name for error messages.
#[must_use]
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn expect_str<'a>(field: &str, value: &'a Value) -> Result<&'a str, FieldError> {
    value.as_str().ok_or_else(|| FieldError::UnexpectedType {
        field: field.to_string(),
        expected: "a string",
        found: json_type(value),
    })
}

pub(crate) fn expect_array<'a>(field: &str, value: &'a Value) -> Result<&'a [Value], FieldError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| FieldError::UnexpectedType {
            field: field.to_string(),
            expected: "an array",
            found: json_type(value),
        })
}

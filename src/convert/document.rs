//! Top-level document tables, validation, and the unknown-field scan.

use crate::model::{ConversionError, Diagnostics, Document, ErrorCode, Origin, Outcome, Severity};
use crate::transform::fields::json_type;
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

/// How a top-level field is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLevel {
    /// Must be present; checked before any mapping
    Required,
    /// Read by the orchestrator
    Mapped,
    /// Recognised but not carried into the target format
    NotConverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopLevelField {
    pub name: &'static str,
    pub kind: TopLevel,
}

const fn field(name: &'static str, kind: TopLevel) -> TopLevelField {
    TopLevelField { name, kind }
}

/// Known top-level fields of one format plus its discriminator, if any.
#[derive(Debug, Clone, Copy)]
pub struct DocumentSchema {
    pub fields: &'static [TopLevelField],
    /// `(field, literal value)` the document must carry
    pub discriminator: Option<(&'static str, &'static str)>,
}

pub const SPDX_DOCUMENT: DocumentSchema = DocumentSchema {
    fields: SPDX_DOCUMENT_FIELDS,
    discriminator: None,
};

pub const CYCLONEDX_DOCUMENT: DocumentSchema = DocumentSchema {
    fields: CYCLONEDX_DOCUMENT_FIELDS,
    discriminator: Some(("bomFormat", CYCLONEDX_BOM_FORMAT)),
};

const SPDX_DOCUMENT_FIELDS: &[TopLevelField] = &[
    field("spdxVersion", TopLevel::Required),
    field("dataLicense", TopLevel::Required),
    field("SPDXID", TopLevel::Required),
    field("name", TopLevel::Required),
    field("documentNamespace", TopLevel::Required),
    field("creationInfo", TopLevel::Mapped),
    field("packages", TopLevel::Mapped),
    field("relationships", TopLevel::Mapped),
    field("documentDescribes", TopLevel::Mapped),
    field("comment", TopLevel::NotConverted),
    field("files", TopLevel::NotConverted),
    field("snippets", TopLevel::NotConverted),
    field("annotations", TopLevel::NotConverted),
    field("hasExtractedLicensingInfos", TopLevel::NotConverted),
    field("externalDocumentRefs", TopLevel::NotConverted),
];

const CYCLONEDX_DOCUMENT_FIELDS: &[TopLevelField] = &[
    field("bomFormat", TopLevel::Required),
    field("specVersion", TopLevel::Required),
    field("version", TopLevel::Required),
    field("$schema", TopLevel::Mapped),
    field("serialNumber", TopLevel::Mapped),
    field("metadata", TopLevel::Mapped),
    field("components", TopLevel::Mapped),
    field("dependencies", TopLevel::Mapped),
    field("services", TopLevel::NotConverted),
    field("externalReferences", TopLevel::NotConverted),
    field("compositions", TopLevel::NotConverted),
    field("properties", TopLevel::NotConverted),
    field("vulnerabilities", TopLevel::NotConverted),
    field("annotations", TopLevel::NotConverted),
    field("formulation", TopLevel::NotConverted),
    field("declarations", TopLevel::NotConverted),
    field("definitions", TopLevel::NotConverted),
    field("signature", TopLevel::NotConverted),
];

/// Literal value `bomFormat` must carry.
pub const CYCLONEDX_BOM_FORMAT: &str = "CycloneDX";

/// Check the root shape and required fields.
///
/// Returns the root object, or the critical errors that stop the
/// conversion. Every missing field is reported, not just the first.
pub fn validate<'a>(
    document: &'a Value,
    schema: &DocumentSchema,
) -> Result<&'a Document, Diagnostics> {
    let mut diagnostics = Diagnostics::new();
    let Some(root) = document.as_object() else {
        diagnostics.error(ConversionError::new(
            "Document root must be a JSON object",
            Origin::Validation,
            ErrorCode::InvalidRoot,
            Severity::Critical,
        ));
        return Err(diagnostics);
    };

    for required in schema.fields.iter().filter(|f| f.kind == TopLevel::Required) {
        if root.get(required.name).map_or(true, Value::is_null) {
            diagnostics.error(ConversionError::missing_field(required.name));
        }
    }

    if let Some((name, expected)) = schema.discriminator {
        let found = root.get(name).filter(|v| !v.is_null());
        if let Some(found) = found.filter(|v| v.as_str() != Some(expected)) {
            diagnostics.error(
                ConversionError::new(
                    format!("{name} must be \"{expected}\", found {found}"),
                    Origin::Validation,
                    ErrorCode::InvalidDiscriminator,
                    Severity::Critical,
                )
                .with_context("field", name),
            );
        }
    }

    if diagnostics.has_critical() {
        Err(diagnostics)
    } else {
        Ok(root)
    }
}

/// Warn about top-level fields that will not appear in the output.
pub fn scan_unknown_fields(document: &Document, schema: &DocumentSchema) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    for (key, value) in document {
        match schema.fields.iter().find(|f| f.name == key) {
            None => diagnostics.warn(format!("Unknown top-level field '{key}' dropped")),
            Some(known) if known.kind == TopLevel::NotConverted && !is_empty(value) => {
                diagnostics.warn(format!("Top-level field '{key}' is not converted"));
            }
            Some(_) => {}
        }
    }
    diagnostics
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Array at `field`, or an empty slice if absent.
///
/// A present non-array value is reported as a field-level error attributed
/// to `origin`.
pub fn array_field<'a>(
    document: &'a Document,
    field: &str,
    origin: Origin,
) -> Outcome<&'a [Value]> {
    match document.get(field) {
        None | Some(Value::Null) => Outcome::clean(&[][..]),
        Some(Value::Array(items)) => Outcome::clean(items.as_slice()),
        Some(other) => {
            let mut diagnostics = Diagnostics::new();
            diagnostics.error(
                ConversionError::field(field, format!("Top-level field '{field}' should be an array"))
                    .with_origin(origin)
                    .with_context("entity", "document")
                .with_context("found", json_type(other)),
            );
            Outcome::new(&[][..], diagnostics)
        }
    }
}

/// UUID at the very end of `text`, e.g. a namespace or `urn:uuid:` serial.
#[must_use]
pub fn trailing_uuid(text: &str) -> Option<Uuid> {
    let start = text.len().checked_sub(UUID_TEXT_LEN)?;
    text.get(start..).and_then(|tail| Uuid::parse_str(tail).ok())
}

const UUID_TEXT_LEN: usize = 36;

/// Warn once per identifier that appears more than once.
pub fn report_duplicate_ids<'a>(ids: impl IntoIterator<Item = &'a str>, label: &str) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let mut seen: IndexMap<&str, usize> = IndexMap::new();
    for id in ids {
        *seen.entry(id).or_default() += 1;
    }
    for (id, count) in seen.into_iter().filter(|(_, count)| *count > 1) {
        diagnostics.warn(format!("Duplicate {label} '{id}' used by {count} entities"));
    }
    diagnostics
}

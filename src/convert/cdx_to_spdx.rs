//! `CycloneDX` JSON → SPDX 2.x JSON.

use super::document::{
    array_field, report_duplicate_ids, scan_unknown_fields, trailing_uuid, validate,
    CYCLONEDX_DOCUMENT,
};
use super::spdx_to_cdx::DOCUMENT_NAME_PROPERTY;
use crate::config::{ConverterConfig, DocumentConfig};
use crate::model::{
    ConversionError, ConversionResult, Diagnostics, Document, Entity, Origin, Outcome,
    RelationshipEdge, SbomFormat,
};
use crate::transform::fields::json_type;
use crate::transform::party::{entity_name_email, format_party, PartyKind};
use crate::transform::{
    EntityKind, EntityTransformer, IdentifierTransformer, RelationshipGraphTransformer,
    SPDX_DOCUMENT_ID,
};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexSet;
use serde_json::{json, Value};
use uuid::Uuid;

/// License of SPDX document metadata; fixed by the SPDX specification.
pub const SPDX_DATA_LICENSE: &str = "CC0-1.0";

const CHILDREN_FIELD: &str = "components";

/// Converts `CycloneDX` BOMs into SPDX documents.
#[derive(Debug, Clone)]
pub struct CycloneDxToSpdx {
    identifiers: IdentifierTransformer,
    entities: EntityTransformer,
    document: DocumentConfig,
    detect_cycles: bool,
}

impl CycloneDxToSpdx {
    #[must_use]
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            identifiers: IdentifierTransformer::new(config.versions.clone()),
            entities: EntityTransformer::new(&config.entities),
            document: config.document.clone(),
            detect_cycles: config.graph.detect_cycles,
        }
    }

    /// Convert one `CycloneDX` BOM.
    ///
    /// A BOM failing validation yields `Value::Null` content and the
    /// critical errors; nothing else is attempted.
    pub fn convert(&self, document: &Value) -> ConversionResult {
        let root = match validate(document, &CYCLONEDX_DOCUMENT) {
            Ok(root) => root,
            Err(diagnostics) => {
                tracing::warn!(
                    errors = diagnostics.errors.len(),
                    "CycloneDX document failed validation"
                );
                return ConversionResult::new(Value::Null, SbomFormat::Spdx, diagnostics);
            }
        };

        let mut diagnostics = Diagnostics::new();
        let metadata = match root.get("metadata") {
            None | Some(Value::Null) => None,
            Some(Value::Object(metadata)) => Some(metadata),
            Some(other) => {
                diagnostics.error(
                    ConversionError::field("metadata", "Field 'metadata' should be an object")
                        .with_context("entity", "document")
                        .with_context("found", json_type(other)),
                );
                None
            }
        };

        let mut spdx = self.document_fields(root, metadata);
        spdx.insert(
            "creationInfo".to_string(),
            diagnostics.absorb(self.creation_info(metadata)),
        );

        // metadata.component first, then every component depth-first
        let mut top_level: Vec<&Value> = metadata
            .and_then(|m| m.get("component"))
            .filter(|c| !c.is_null())
            .into_iter()
            .collect();
        top_level.extend(diagnostics.absorb(array_field(root, CHILDREN_FIELD, Origin::Entity)));
        let flattened = flatten_components(&top_level);

        let packages = diagnostics.absorb(
            self.entities
                .transform_many(EntityKind::Component, &flattened),
        );
        diagnostics.merge(report_duplicate_ids(
            packages
                .iter()
                .filter_map(|p| p.get("SPDXID").and_then(Value::as_str)),
            "SPDXID",
        ));

        let known: IndexSet<String> = flattened
            .iter()
            .filter_map(|c| c.get("bom-ref").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        let top_level: Vec<&Entity> = top_level.iter().filter_map(|c| c.as_object()).collect();
        let relationships = diagnostics.absorb(self.relationships(root, &top_level, &known));

        tracing::info!(
            packages = packages.len(),
            relationships = relationships.len(),
            "Converted CycloneDX document to SPDX"
        );
        spdx.insert(
            "packages".to_string(),
            Value::Array(packages.into_iter().map(Value::Object).collect()),
        );
        spdx.insert(
            "relationships".to_string(),
            Value::Array(relationships.iter().map(RelationshipEdge::to_value).collect()),
        );

        diagnostics.merge(scan_unknown_fields(root, &CYCLONEDX_DOCUMENT));
        ConversionResult::new(Value::Object(spdx), SbomFormat::Spdx, diagnostics)
    }

    /// SPDX header: version, data license, document id, name, namespace.
    fn document_fields(&self, root: &Document, metadata: Option<&Document>) -> Document {
        let spec_version = root
            .get("specVersion")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let name = self.document_name(metadata);
        let uuid = root
            .get("serialNumber")
            .and_then(Value::as_str)
            .and_then(trailing_uuid)
            .unwrap_or_else(Uuid::new_v4);
        let namespace = format!(
            "{}/{}-{uuid}",
            self.document.namespace_base.trim_end_matches('/'),
            namespace_segment(&name)
        );

        let mut spdx = Document::new();
        spdx.insert(
            "spdxVersion".to_string(),
            json!(self.identifiers.cyclonedx_to_spdx_version(spec_version)),
        );
        spdx.insert("dataLicense".to_string(), json!(SPDX_DATA_LICENSE));
        spdx.insert("SPDXID".to_string(), json!(SPDX_DOCUMENT_ID));
        spdx.insert("name".to_string(), json!(name));
        spdx.insert("documentNamespace".to_string(), json!(namespace));
        spdx
    }

    /// Carried document name, else the root component's name, else the
    /// configured fallback.
    fn document_name(&self, metadata: Option<&Document>) -> String {
        let from_property = metadata
            .and_then(|m| m.get("properties"))
            .and_then(Value::as_array)
            .and_then(|properties| {
                properties
                    .iter()
                    .find(|p| p.get("name").and_then(Value::as_str) == Some(DOCUMENT_NAME_PROPERTY))
            })
            .and_then(|p| p.get("value"))
            .and_then(Value::as_str);
        let from_component = metadata
            .and_then(|m| m.get("component"))
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str);

        from_property
            .or(from_component)
            .filter(|name| !name.trim().is_empty())
            .map_or_else(|| self.document.fallback_name.clone(), str::to_string)
    }

    /// `metadata` → `creationInfo`, always listing this tool as a creator.
    fn creation_info(&self, metadata: Option<&Document>) -> Outcome<Value> {
        let mut diagnostics = Diagnostics::new();
        let mut creators: IndexSet<String> = IndexSet::new();

        let created = match metadata
            .and_then(|m| m.get("timestamp"))
            .and_then(Value::as_str)
        {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(timestamp) => timestamp
                    .with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
                Err(err) => {
                    diagnostics.warn(format!(
                        "Timestamp '{raw}' is not RFC 3339 ({err}); using current time"
                    ));
                    super::now_timestamp()
                }
            },
            None => super::now_timestamp(),
        };

        if let Some(metadata) = metadata {
            for tool in tool_entries(metadata.get("tools")) {
                match tool.get("name").and_then(Value::as_str) {
                    Some(name) => {
                        let creator = match tool.get("version").and_then(Value::as_str) {
                            Some(version) => format!("Tool: {name}-{version}"),
                            None => format!("Tool: {name}"),
                        };
                        creators.insert(creator);
                    }
                    None => diagnostics.warn("Tool entry in metadata has no name; skipped"),
                }
            }
            let authors = metadata
                .get("authors")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for author in authors {
                match entity_name_email(author) {
                    Some((name, email)) => {
                        creators.insert(format_party(PartyKind::Person, name, email));
                    }
                    None => diagnostics.warn("Author entry in metadata has no name; skipped"),
                }
            }
            if let Some((name, email)) = metadata.get("supplier").and_then(entity_name_email) {
                creators.insert(format_party(PartyKind::Organization, name, email));
            }
        }
        creators.insert(format!("Tool: {}", self.document.creator_tool));

        let creation = json!({
            "created": created,
            "creators": creators.into_iter().collect::<Vec<_>>(),
        });
        Outcome::new(creation, diagnostics)
    }

    /// Structural `DESCRIBES`/`CONTAINS` edges plus inverted dependencies.
    fn relationships(
        &self,
        root: &Document,
        top_level: &[&Entity],
        known: &IndexSet<String>,
    ) -> Outcome<Vec<RelationshipEdge>> {
        let mut diagnostics = Diagnostics::new();
        let spdx_id = |entity: &Entity| {
            entity
                .get("bom-ref")
                .and_then(Value::as_str)
                .filter(|r| !r.is_empty())
                .map(IdentifierTransformer::format_as_id)
        };
        let mut edges = diagnostics.absorb(RelationshipGraphTransformer::synthesize_structural(
            SPDX_DOCUMENT_ID,
            top_level,
            CHILDREN_FIELD,
            spdx_id,
        ));

        let raw = diagnostics.absorb(array_field(root, "dependencies", Origin::Relationship));
        let dependencies = diagnostics.absorb(RelationshipGraphTransformer::parse_dependencies(raw));
        let dependencies = diagnostics.absorb(RelationshipGraphTransformer::sanitize_references(
            dependencies,
            known,
        ));
        let dependency_edges = RelationshipGraphTransformer::dependencies_to_edges(
            &dependencies,
            IdentifierTransformer::format_as_id,
        );

        if self.detect_cycles {
            let cycles =
                diagnostics.absorb(RelationshipGraphTransformer::detect_cycles(&dependency_edges));
            if !cycles.is_empty() {
                tracing::debug!(count = cycles.len(), "Dependency cycles found");
            }
        }

        edges.extend(dependency_edges);
        Outcome::new(edges, diagnostics)
    }
}

/// `metadata.tools` in either the legacy array form or the
/// `{components, services}` object form.
fn tool_entries(tools: Option<&Value>) -> Vec<&Value> {
    match tools {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(groups)) => ["components", "services"]
            .iter()
            .filter_map(|group| groups.get(*group).and_then(Value::as_array))
            .flatten()
            .collect(),
        _ => Vec::new(),
    }
}

/// Pre-order walk over nested `components`, without recursion.
fn flatten_components<'a>(top_level: &[&'a Value]) -> Vec<&'a Value> {
    let mut flattened = Vec::with_capacity(top_level.len());
    let mut stack: Vec<&Value> = top_level.iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        flattened.push(node);
        if let Some(children) = node.get(CHILDREN_FIELD).and_then(Value::as_array) {
            stack.extend(children.iter().rev());
        }
    }
    flattened
}

/// Document name as a URI path segment.
fn namespace_segment(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

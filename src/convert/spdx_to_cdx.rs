//! SPDX 2.x JSON → `CycloneDX` JSON.

use super::document::{
    array_field, report_duplicate_ids, scan_unknown_fields, trailing_uuid, validate,
    CYCLONEDX_BOM_FORMAT, SPDX_DOCUMENT,
};
use crate::config::ConverterConfig;
use crate::model::{
    ConversionError, ConversionResult, DependencyEdge, Diagnostics, Document, Entity, Origin,
    Outcome, RelationshipEdge, SbomFormat,
};
use crate::transform::fields::json_type;
use crate::transform::party::{Party, PartyKind};
use crate::transform::relationships::{DESCRIBED_BY, DESCRIBES};
use crate::transform::{
    EntityKind, EntityTransformer, IdentifierTransformer, RelationshipGraphTransformer,
    SPDX_DOCUMENT_ID,
};
use indexmap::IndexSet;
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Property carrying the SPDX document name through a `CycloneDX` BOM.
pub const DOCUMENT_NAME_PROPERTY: &str = "spdx:document:name";

/// Converts SPDX documents into `CycloneDX` BOMs.
#[derive(Debug, Clone)]
pub struct SpdxToCycloneDx {
    identifiers: IdentifierTransformer,
    entities: EntityTransformer,
    detect_cycles: bool,
}

impl SpdxToCycloneDx {
    #[must_use]
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            identifiers: IdentifierTransformer::new(config.versions.clone()),
            entities: EntityTransformer::new(&config.entities),
            detect_cycles: config.graph.detect_cycles,
        }
    }

    /// Convert one SPDX document.
    ///
    /// A document failing validation yields `Value::Null` content and the
    /// critical errors; nothing else is attempted.
    pub fn convert(&self, document: &Value) -> ConversionResult {
        let root = match validate(document, &SPDX_DOCUMENT) {
            Ok(root) => root,
            Err(diagnostics) => {
                tracing::warn!(
                    errors = diagnostics.errors.len(),
                    "SPDX document failed validation"
                );
                return ConversionResult::new(Value::Null, SbomFormat::CycloneDx, diagnostics);
            }
        };

        let mut diagnostics = Diagnostics::new();
        let mut bom = self.document_fields(root);
        bom.insert("metadata".to_string(), diagnostics.absorb(metadata(root)));

        let packages = diagnostics.absorb(array_field(root, "packages", Origin::Entity));
        let mut components = diagnostics.absorb(
            self.entities
                .transform_many(EntityKind::Package, packages),
        );
        let known: IndexSet<String> = components
            .iter()
            .filter_map(|c| c.get("bom-ref").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        diagnostics.merge(report_duplicate_ids(
            components
                .iter()
                .filter_map(|c| c.get("bom-ref").and_then(Value::as_str)),
            "bom-ref",
        ));

        let relationships =
            diagnostics.absorb(array_field(root, "relationships", Origin::Relationship));
        let edges = diagnostics.absorb(RelationshipGraphTransformer::parse_edges(relationships));
        // Edges touching the document itself are structural, not dependencies
        let (document_edges, element_edges): (Vec<_>, Vec<_>) = edges
            .into_iter()
            .partition(|edge| edge.source == SPDX_DOCUMENT_ID || edge.target == SPDX_DOCUMENT_ID);

        let described = diagnostics.absorb(described_ids(root, &document_edges));
        let root_component = diagnostics.absorb(take_root_component(&mut components, &described));
        let dependencies = diagnostics.absorb(self.dependencies(&element_edges, &known));

        tracing::info!(
            components = components.len(),
            dependencies = dependencies.len(),
            "Converted SPDX document to CycloneDX"
        );
        if let (Some(component), Some(Value::Object(metadata))) =
            (root_component, bom.get_mut("metadata"))
        {
            metadata.insert("component".to_string(), Value::Object(component));
        }
        bom.insert(
            "components".to_string(),
            Value::Array(components.into_iter().map(Value::Object).collect()),
        );
        bom.insert("dependencies".to_string(), Value::Array(dependencies));

        diagnostics.merge(scan_unknown_fields(root, &SPDX_DOCUMENT));
        fill_defaults(&mut bom);
        ConversionResult::new(Value::Object(bom), SbomFormat::CycloneDx, diagnostics)
    }

    /// BOM header: format, spec version, serial number, BOM version.
    fn document_fields(&self, root: &Document) -> Document {
        let spdx_version = root
            .get("spdxVersion")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let uuid = root
            .get("documentNamespace")
            .and_then(Value::as_str)
            .and_then(trailing_uuid)
            .unwrap_or_else(Uuid::new_v4);

        let mut bom = Document::new();
        bom.insert("bomFormat".to_string(), json!(CYCLONEDX_BOM_FORMAT));
        bom.insert(
            "specVersion".to_string(),
            json!(self.identifiers.spdx_to_cyclonedx_version(spdx_version)),
        );
        bom.insert("serialNumber".to_string(), json!(format!("urn:uuid:{uuid}")));
        bom.insert("version".to_string(), json!(1));
        bom
    }

    /// SPDX element relationships → sanitized `CycloneDX` dependency list.
    fn dependencies(&self, edges: &[RelationshipEdge], known: &IndexSet<String>) -> Outcome<Vec<Value>> {
        let mut diagnostics = Diagnostics::new();

        if self.detect_cycles {
            let cycles = diagnostics.absorb(RelationshipGraphTransformer::detect_cycles(edges));
            if !cycles.is_empty() {
                tracing::debug!(count = cycles.len(), "Dependency cycles found");
            }
        }

        let edges: Vec<RelationshipEdge> = edges
            .iter()
            .map(|edge| {
                RelationshipEdge::new(
                    IdentifierTransformer::strip_prefix(&edge.source),
                    IdentifierTransformer::strip_prefix(&edge.target),
                    edge.relationship_type.as_str(),
                )
            })
            .collect();
        let adjacency = diagnostics.absorb(RelationshipGraphTransformer::build_adjacency(&edges));
        let list = RelationshipGraphTransformer::format_as_dependency_list(&adjacency);
        let list = diagnostics.absorb(RelationshipGraphTransformer::sanitize_references(list, known));

        Outcome::new(list.iter().map(DependencyEdge::to_value).collect(), diagnostics)
    }
}

/// SPDX ids the document describes, in order: `documentDescribes` entries,
/// then `DESCRIBES` / `DESCRIBED_BY` relationships with the document.
fn described_ids(root: &Document, document_edges: &[RelationshipEdge]) -> Outcome<IndexSet<String>> {
    let mut diagnostics = Diagnostics::new();
    let mut described = IndexSet::new();

    for entry in diagnostics.absorb(array_field(root, "documentDescribes", Origin::Relationship)) {
        match entry.as_str() {
            Some(id) => {
                described.insert(id.to_string());
            }
            None => diagnostics.warn(format!("documentDescribes entry {entry} is not a string; skipped")),
        }
    }
    for edge in document_edges {
        match edge.relationship_type.as_str() {
            DESCRIBES if edge.source == SPDX_DOCUMENT_ID => {
                described.insert(edge.target.clone());
            }
            DESCRIBED_BY if edge.target == SPDX_DOCUMENT_ID => {
                described.insert(edge.source.clone());
            }
            _ => {}
        }
    }
    Outcome::new(described, diagnostics)
}

/// Remove the first described package from `components`; it becomes
/// `metadata.component`. Further described packages stay top-level.
fn take_root_component(
    components: &mut Vec<Entity>,
    described: &IndexSet<String>,
) -> Outcome<Option<Entity>> {
    let Some(first) = described.first() else {
        return Outcome::clean(None);
    };
    let reference = IdentifierTransformer::strip_prefix(first);
    let position = components
        .iter()
        .position(|c| c.get("bom-ref").and_then(Value::as_str) == Some(reference));

    match position {
        Some(index) => Outcome::clean(Some(components.remove(index))),
        None => {
            let mut diagnostics = Diagnostics::new();
            diagnostics.warn(format!(
                "Described element '{first}' is not a package; metadata.component not set"
            ));
            Outcome::new(None, diagnostics)
        }
    }
}

/// `creationInfo` and document name → `metadata`.
fn metadata(root: &Document) -> Outcome<Value> {
    let mut diagnostics = Diagnostics::new();
    let mut metadata = Map::new();

    match root.get("creationInfo") {
        None | Some(Value::Null) => {}
        Some(Value::Object(creation)) => {
            if let Some(created) = creation.get("created").and_then(Value::as_str) {
                metadata.insert("timestamp".to_string(), json!(created));
            }
            let creators = creation
                .get("creators")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            diagnostics.merge(creators_to_metadata(creators, &mut metadata));
        }
        Some(other) => diagnostics.error(
            ConversionError::field("creationInfo", "Field 'creationInfo' should be an object")
                .with_context("entity", "document")
                .with_context("found", json_type(other)),
        ),
    }

    if let Some(name) = root.get("name").and_then(Value::as_str) {
        metadata.insert(
            "properties".to_string(),
            json!([{ "name": DOCUMENT_NAME_PROPERTY, "value": name }]),
        );
    }
    Outcome::new(Value::Object(metadata), diagnostics)
}

/// `Tool:` → `tools`, `Person:` → `authors`, first `Organization:` → `supplier`.
fn creators_to_metadata(creators: &[Value], metadata: &mut Map<String, Value>) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let mut tools = Vec::new();
    let mut authors = Vec::new();
    let mut supplier: Option<Value> = None;

    for creator in creators {
        let Some(text) = creator.as_str() else {
            diagnostics.warn(format!("Creator {creator} is not a string; skipped"));
            continue;
        };
        let Some(party) = Party::parse(text) else {
            continue;
        };
        match party.kind {
            Some(PartyKind::Tool) => tools.push(tool_entry(party.name)),
            Some(PartyKind::Person) => authors.push(party.to_contact()),
            Some(PartyKind::Organization) if supplier.is_none() => {
                supplier = Some(party.to_organization());
            }
            Some(PartyKind::Organization) => {
                diagnostics.warn(format!("Additional organization creator '{text}' not converted"));
            }
            None => diagnostics.warn(format!(
                "Creator '{text}' has no Person, Organization, or Tool prefix; skipped"
            )),
        }
    }

    if !tools.is_empty() {
        metadata.insert("tools".to_string(), Value::Array(tools));
    }
    if !authors.is_empty() {
        metadata.insert("authors".to_string(), Value::Array(authors));
    }
    if let Some(supplier) = supplier {
        metadata.insert("supplier".to_string(), supplier);
    }
    diagnostics
}

/// `syft-0.100.0` → `{"name": "syft", "version": "0.100.0"}`.
fn tool_entry(text: &str) -> Value {
    match text.rsplit_once('-') {
        Some((name, version))
            if !name.is_empty() && version.starts_with(|c: char| c.is_ascii_digit()) =>
        {
            json!({ "name": name, "version": version })
        }
        _ => json!({ "name": text }),
    }
}

fn fill_defaults(bom: &mut Document) {
    if let Some(Value::Object(metadata)) = bom.get_mut("metadata") {
        metadata
            .entry("timestamp")
            .or_insert_with(|| json!(super::now_timestamp()));
    }
    bom.entry("components").or_insert_with(|| json!([]));
    bom.entry("dependencies").or_insert_with(|| json!([]));
}

//! Relationship graph conversion: SPDX edge lists ⇄ adjacency maps ⇄
//! `CycloneDX` dependency lists.
//!
//! The adjacency map is insertion-ordered and each target set is unique, so
//! the dependency list produced from it is deterministic for a given input
//! order. Cycle detection and structural synthesis both use explicit stacks
//! and cope with arbitrarily deep graphs.

use crate::model::{DependencyEdge, Entity, Outcome, RelationshipEdge};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::collections::HashSet;

/// Source id → ordered unique target ids.
pub type Adjacency = IndexMap<String, IndexSet<String>>;

pub const DEPENDS_ON: &str = "DEPENDS_ON";
pub const CONTAINS: &str = "CONTAINS";
pub const DESCRIBES: &str = "DESCRIBES";
pub const DESCRIBED_BY: &str = "DESCRIBED_BY";

/// Relationship types carried into the dependency graph.
pub const SUPPORTED_RELATIONSHIP_TYPES: &[&str] =
    &[DEPENDS_ON, CONTAINS, "STATIC_LINK", "DYNAMIC_LINK"];

/// Edge-list, adjacency and dependency-list conversions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipGraphTransformer;

impl RelationshipGraphTransformer {
    /// Read SPDX relationship objects, skipping ones with missing fields.
    pub fn parse_edges(values: &[Value]) -> Outcome<Vec<RelationshipEdge>> {
        let mut outcome = Outcome::clean(Vec::with_capacity(values.len()));
        for (index, value) in values.iter().enumerate() {
            match RelationshipEdge::from_value(value) {
                Ok(edge) => outcome.value.push(edge),
                Err(field) => outcome.diagnostics.warn(format!(
                    "Relationship {index} missing required field: {field}; skipped"
                )),
            }
        }
        outcome
    }

    /// Build the adjacency map from supported edges.
    ///
    /// Exact duplicate triples are dropped silently. Dependency-like types
    /// outside the supported set warn; anything else is ignored.
    pub fn build_adjacency(edges: &[RelationshipEdge]) -> Outcome<Adjacency> {
        let mut outcome = Outcome::clean(Adjacency::new());
        let mut seen: HashSet<(&str, &str, &str)> = HashSet::with_capacity(edges.len());

        for edge in edges {
            if !seen.insert(edge.key()) {
                continue;
            }
            if !SUPPORTED_RELATIONSHIP_TYPES.contains(&edge.relationship_type.as_str()) {
                if edge.relationship_type.to_uppercase().contains("DEPEND") {
                    outcome.diagnostics.warn(format!(
                        "Unsupported relationship type: {} ({} -> {})",
                        edge.relationship_type, edge.source, edge.target
                    ));
                }
                continue;
            }
            outcome
                .value
                .entry(edge.source.clone())
                .or_default()
                .insert(edge.target.clone());
        }
        outcome
    }

    /// One dependency entry per source with at least one target, in map order.
    #[must_use]
    pub fn format_as_dependency_list(adjacency: &Adjacency) -> Vec<DependencyEdge> {
        adjacency
            .iter()
            .filter(|(_, targets)| !targets.is_empty())
            .map(|(source, targets)| DependencyEdge::new(source.clone(), targets.iter().cloned()))
            .collect()
    }

    /// Read `CycloneDX` dependency objects.
    ///
    /// Entries without a string `ref` or a `dependsOn` list are skipped with
    /// a warning. An empty `dependsOn` is valid. Non-string targets are
    /// dropped with a warning.
    pub fn parse_dependencies(values: &[Value]) -> Outcome<Vec<DependencyEdge>> {
        let mut outcome = Outcome::clean(Vec::with_capacity(values.len()));

        for (index, value) in values.iter().enumerate() {
            let Some(reference) = value
                .get("ref")
                .and_then(Value::as_str)
                .filter(|r| !r.is_empty())
            else {
                outcome
                    .diagnostics
                    .warn(format!("Dependency {index} missing required field: ref; skipped"));
                continue;
            };
            let Some(targets) = value.get("dependsOn").and_then(Value::as_array) else {
                outcome.diagnostics.warn(format!(
                    "Dependency '{reference}' has no dependsOn list; skipped"
                ));
                continue;
            };

            let mut depends_on = Vec::with_capacity(targets.len());
            for target in targets {
                match target.as_str().filter(|t| !t.is_empty()) {
                    Some(target) => depends_on.push(target.to_string()),
                    None => outcome.diagnostics.warn(format!(
                        "Dependency '{reference}' has a non-string target; dropped"
                    )),
                }
            }
            outcome.value.push(DependencyEdge::new(reference, depends_on));
        }
        outcome
    }

    /// Invert a dependency list into `DEPENDS_ON` edges, deduplicated.
    ///
    /// `map_id` turns a `CycloneDX` ref into the identifier used on the edge.
    pub fn dependencies_to_edges(
        dependencies: &[DependencyEdge],
        map_id: impl Fn(&str) -> String,
    ) -> Vec<RelationshipEdge> {
        let mut edges: IndexSet<RelationshipEdge> = IndexSet::new();
        for dependency in dependencies {
            let source = map_id(&dependency.reference);
            for target in &dependency.depends_on {
                edges.insert(RelationshipEdge::new(source.clone(), map_id(target), DEPENDS_ON));
            }
        }
        edges.into_iter().collect()
    }

    /// Report every dependency cycle reachable from every node.
    ///
    /// Only `DEPENDS_ON` edges are considered. Each start node gets a fresh
    /// traversal, so a cycle of length n is reported up to n times, once
    /// per member it can be entered from.
    pub fn detect_cycles(edges: &[RelationshipEdge]) -> Outcome<Vec<Vec<String>>> {
        let mut graph: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
        for edge in edges.iter().filter(|e| e.relationship_type == DEPENDS_ON) {
            graph
                .entry(edge.source.as_str())
                .or_default()
                .insert(edge.target.as_str());
        }

        let mut outcome = Outcome::clean(Vec::new());
        for &start in graph.keys() {
            for cycle in cycles_from(&graph, start) {
                outcome.diagnostics.warn(format!(
                    "Circular dependency detected: {}",
                    cycle.join(" -> ")
                ));
                outcome.value.push(cycle);
            }
        }
        outcome
    }

    /// `DESCRIBES` edges from `root` to each top-level entity and
    /// `CONTAINS` edges for every nested parent/child pair.
    ///
    /// `id_of` yields an entity's identifier; entities without one are
    /// skipped with a warning, together with everything nested below them.
    pub fn synthesize_structural(
        root: &str,
        entities: &[&Entity],
        children_field: &str,
        id_of: impl Fn(&Entity) -> Option<String>,
    ) -> Outcome<Vec<RelationshipEdge>> {
        let mut outcome = Outcome::clean(Vec::new());
        let mut stack: Vec<(String, &Entity)> = Vec::new();

        for (index, &entity) in entities.iter().enumerate() {
            let Some(id) = id_of(entity) else {
                outcome.diagnostics.warn(format!(
                    "Top-level entity {index} has no identifier; no {DESCRIBES} relationship created"
                ));
                continue;
            };
            outcome
                .value
                .push(RelationshipEdge::new(root, id.clone(), DESCRIBES));

            stack.push((id, entity));
            while let Some((parent, node)) = stack.pop() {
                let children = node
                    .get(children_field)
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();

                let mut pending = Vec::with_capacity(children.len());
                for child in children.iter().filter_map(Value::as_object) {
                    match id_of(child) {
                        Some(child_id) => {
                            outcome.value.push(RelationshipEdge::new(
                                parent.clone(),
                                child_id.clone(),
                                CONTAINS,
                            ));
                            pending.push((child_id, child));
                        }
                        None => outcome.diagnostics.warn(format!(
                            "Nested entity under '{parent}' has no identifier; skipped"
                        )),
                    }
                }
                stack.extend(pending.into_iter().rev());
            }
        }
        outcome
    }

    /// Drop dependency entries and targets that name unknown entities.
    ///
    /// Entries whose `dependsOn` was empty to begin with are kept as-is;
    /// only entries emptied here are removed.
    pub fn sanitize_references(
        dependencies: Vec<DependencyEdge>,
        known: &IndexSet<String>,
    ) -> Outcome<Vec<DependencyEdge>> {
        let mut outcome = Outcome::clean(Vec::with_capacity(dependencies.len()));

        for dependency in dependencies {
            if !known.contains(&dependency.reference) {
                outcome.diagnostics.warn(format!(
                    "Dependency references unknown component '{}'; dropped",
                    dependency.reference
                ));
                continue;
            }

            let originally_empty = dependency.depends_on.is_empty();
            let mut valid = Vec::with_capacity(dependency.depends_on.len());
            for target in dependency.depends_on {
                if known.contains(&target) {
                    valid.push(target);
                } else {
                    outcome.diagnostics.warn(format!(
                        "Dependency of '{}' on unknown component '{target}' dropped",
                        dependency.reference
                    ));
                }
            }

            if valid.is_empty() && !originally_empty {
                outcome.diagnostics.warn(format!(
                    "Dependency '{}' has no valid targets left; dropped",
                    dependency.reference
                ));
                continue;
            }
            outcome.value.push(DependencyEdge {
                reference: dependency.reference,
                depends_on: valid,
            });
        }
        outcome
    }
}

/// Iterative DFS from `start`, returning each cycle as a closed path.
fn cycles_from(graph: &IndexMap<&str, IndexSet<&str>>, start: &str) -> Vec<Vec<String>> {
    let mut cycles = Vec::new();
    let mut visited: HashSet<&str> = HashSet::from([start]);
    let mut on_path: HashSet<&str> = HashSet::from([start]);
    let mut path: Vec<&str> = vec![start];
    // (node, index of the next neighbor to visit)
    let mut stack: Vec<(&str, usize)> = vec![(start, 0)];

    while let Some(frame) = stack.last_mut() {
        let (node, next) = *frame;
        let neighbor = graph.get(node).and_then(|targets| targets.get_index(next));
        let Some(&neighbor) = neighbor else {
            stack.pop();
            path.pop();
            on_path.remove(node);
            continue;
        };
        frame.1 += 1;

        if on_path.contains(neighbor) {
            let from = path.iter().position(|n| *n == neighbor).unwrap_or_default();
            let mut cycle: Vec<String> = path[from..].iter().map(|n| (*n).to_string()).collect();
            cycle.push(neighbor.to_string());
            cycles.push(cycle);
        } else if visited.insert(neighbor) {
            on_path.insert(neighbor);
            path.push(neighbor);
            stack.push((neighbor, 0));
        }
    }
    cycles
}

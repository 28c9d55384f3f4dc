//! Typed graph edges for both relationship encodings.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// SPDX relationship: an ordered `(source, target, type)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipEdge {
    /// Source element identifier (`spdxElementId`)
    pub source: String,
    /// Target element identifier (`relatedSpdxElement`)
    pub target: String,
    /// Relationship type, e.g. `DEPENDS_ON`
    pub relationship_type: String,
}

impl RelationshipEdge {
    /// Create a new edge
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relationship_type: relationship_type.into(),
        }
    }

    /// Deduplication key: `(source, type, target)`.
    #[must_use]
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.source, &self.relationship_type, &self.target)
    }

    /// Read an edge from an SPDX relationship object.
    ///
    /// Returns the name of the first missing (or non-string / empty) field
    /// on failure.
    pub fn from_value(value: &Value) -> Result<Self, &'static str> {
        let field = |name: &'static str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .ok_or(name)
        };
        Ok(Self::new(
            field("spdxElementId")?,
            field("relatedSpdxElement")?,
            field("relationshipType")?,
        ))
    }

    /// Render as an SPDX relationship object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({
            "spdxElementId": self.source,
            "relatedSpdxElement": self.target,
            "relationshipType": self.relationship_type,
        })
    }
}

impl std::fmt::Display for RelationshipEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.source, self.relationship_type, self.target
        )
    }
}

/// `CycloneDX` dependency entry: a ref and the unique refs it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The depending element (`ref`)
    pub reference: String,
    /// Ordered, unique dependency refs (`dependsOn`)
    pub depends_on: Vec<String>,
}

impl DependencyEdge {
    /// Create a dependency entry, dropping repeated targets while keeping order.
    pub fn new(reference: impl Into<String>, depends_on: impl IntoIterator<Item = String>) -> Self {
        let unique: IndexSet<String> = depends_on.into_iter().collect();
        Self {
            reference: reference.into(),
            depends_on: unique.into_iter().collect(),
        }
    }

    /// Render as a `CycloneDX` dependency object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({
            "ref": self.reference,
            "dependsOn": self.depends_on,
        })
    }
}

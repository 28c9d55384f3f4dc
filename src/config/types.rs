//! Configuration types for sbom-convert.
//!
//! Every field has a default, so a config file only needs the values it
//! wants to change.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Top-level converter configuration, loadable from YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ConverterConfig {
    /// Spec version fallbacks for values outside the version table
    pub versions: VersionConfig,
    /// Document-level defaults filled into converted output
    pub document: DocumentConfig,
    /// Relationship graph options
    pub graph: GraphConfig,
    /// Entity mapping options
    pub entities: EntityConfig,
}

impl ConverterConfig {
    /// Create a new `ConverterConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// "Latest" versions used when a source version is not in the version table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VersionConfig {
    /// SPDX version emitted for unmapped `CycloneDX` spec versions
    pub latest_spdx: String,
    /// `CycloneDX` spec version emitted for unmapped SPDX versions
    pub latest_cyclonedx: String,
}

/// Defaults used when building the target document's header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DocumentConfig {
    /// Base URI for generated SPDX `documentNamespace` values
    pub namespace_base: String,
    /// SPDX document name when the source carries none
    pub fallback_name: String,
    /// Tool name recorded as creator of converted documents
    pub creator_tool: String,
}

/// Relationship graph options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GraphConfig {
    /// Report dependency cycles as warnings
    pub detect_cycles: bool,
}

/// Entity mapping options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EntityConfig {
    /// Entity count at which per-item transforms run on the rayon pool
    #[schemars(range(min = 1))]
    pub parallel_threshold: usize,
}

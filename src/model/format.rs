//! SBOM format discriminator and document aliases.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parsed SBOM document: the JSON object at the root of the file.
pub type Document = Map<String, Value>;

/// A single package (SPDX) or component (`CycloneDX`) object.
pub type Entity = Map<String, Value>;

/// SBOM format type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SbomFormat {
    /// SPDX 2.x JSON (packages and relationships)
    #[value(alias = "spdx-json")]
    Spdx,
    /// `CycloneDX` 1.x JSON (components and dependencies)
    #[value(name = "cyclonedx", alias = "cdx")]
    #[serde(rename = "cyclonedx")]
    CycloneDx,
}

impl SbomFormat {
    /// Human-readable format name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Spdx => "SPDX",
            Self::CycloneDx => "CycloneDX",
        }
    }

    /// The format a document of this format converts into.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Spdx => Self::CycloneDx,
            Self::CycloneDx => Self::Spdx,
        }
    }
}

impl std::fmt::Display for SbomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

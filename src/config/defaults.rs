//! Default configuration values.

use super::types::{DocumentConfig, EntityConfig, GraphConfig, VersionConfig};

/// SPDX version used when a `CycloneDX` spec version has no table entry.
pub const DEFAULT_LATEST_SPDX_VERSION: &str = "SPDX-2.3";

/// `CycloneDX` spec version used when an SPDX version has no table entry.
pub const DEFAULT_LATEST_CYCLONEDX_VERSION: &str = "1.6";

/// Base URI for generated SPDX document namespaces.
pub const DEFAULT_NAMESPACE_BASE: &str = "https://spdx.org/spdxdocs";

/// Entity lists at least this long are transformed in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 512;

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            latest_spdx: DEFAULT_LATEST_SPDX_VERSION.to_string(),
            latest_cyclonedx: DEFAULT_LATEST_CYCLONEDX_VERSION.to_string(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            namespace_base: DEFAULT_NAMESPACE_BASE.to_string(),
            fallback_name: "converted-sbom".to_string(),
            creator_tool: format!("sbom-convert-{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            detect_cycles: true,
        }
    }
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

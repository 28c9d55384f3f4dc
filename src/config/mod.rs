//! Configuration module for sbom-convert.
//!
//! This module provides:
//! - Type-safe configuration structures with defaults for every field
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sbom_convert::config::{ConverterConfig, file::load_or_default};
//!
//! // Use defaults
//! let config = ConverterConfig::default();
//!
//! // Load from a discovered file, falling back to defaults
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.sbom-convert.yaml` file in your project root or
//! `~/.config/sbom-convert/`:
//!
//! ```yaml
//! versions:
//!   latest_cyclonedx: "1.6"
//! graph:
//!   detect_cycles: true
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    DEFAULT_LATEST_CYCLONEDX_VERSION, DEFAULT_LATEST_SPDX_VERSION, DEFAULT_NAMESPACE_BASE,
    DEFAULT_PARALLEL_THRESHOLD,
};
pub use types::{ConverterConfig, DocumentConfig, EntityConfig, GraphConfig, VersionConfig};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// Generate a JSON Schema for the `ConverterConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.sbom-convert.yaml` config files.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(ConverterConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_sections() {
        let schema = generate_json_schema();
        for section in ["versions", "document", "graph", "entities"] {
            assert!(schema.contains(section), "schema missing {section}");
        }
    }
}

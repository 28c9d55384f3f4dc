//! Configuration validation for sbom-convert.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{ConverterConfig, DocumentConfig, EntityConfig, VersionConfig};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for ConverterConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.versions.validate());
        errors.extend(self.document.validate());
        errors.extend(self.entities.validate());
        errors
    }
}

impl Validatable for VersionConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if !self.latest_spdx.starts_with("SPDX-") {
            errors.push(ConfigError {
                field: "versions.latest_spdx".to_string(),
                message: format!(
                    "SPDX versions look like 'SPDX-2.3', got '{}'",
                    self.latest_spdx
                ),
            });
        }

        let cdx_shape = self
            .latest_cyclonedx
            .split_once('.')
            .is_some_and(|(major, minor)| {
                !major.is_empty()
                    && !minor.is_empty()
                    && major.chars().all(|c| c.is_ascii_digit())
                    && minor.chars().all(|c| c.is_ascii_digit())
            });
        if !cdx_shape {
            errors.push(ConfigError {
                field: "versions.latest_cyclonedx".to_string(),
                message: format!(
                    "CycloneDX spec versions look like '1.6', got '{}'",
                    self.latest_cyclonedx
                ),
            });
        }
        errors
    }
}

impl Validatable for DocumentConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if !(self.namespace_base.starts_with("http://")
            || self.namespace_base.starts_with("https://"))
        {
            errors.push(ConfigError {
                field: "document.namespace_base".to_string(),
                message: format!(
                    "Namespace base must be an http(s) URI, got '{}'",
                    self.namespace_base
                ),
            });
        }
        if self.fallback_name.trim().is_empty() {
            errors.push(ConfigError {
                field: "document.fallback_name".to_string(),
                message: "Fallback document name cannot be empty".to_string(),
            });
        }
        if self.creator_tool.trim().is_empty() {
            errors.push(ConfigError {
                field: "document.creator_tool".to_string(),
                message: "Creator tool cannot be empty".to_string(),
            });
        }
        errors
    }
}

impl Validatable for EntityConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.parallel_threshold == 0 {
            errors.push(ConfigError {
                field: "entities.parallel_threshold".to_string(),
                message: "Parallel threshold must be at least 1".to_string(),
            });
        }
        errors
    }
}

//! Conversion result returned by the orchestrators.

use super::{ConversionError, Diagnostics, Origin, SbomFormat, Severity};
use serde::Serialize;
use serde_json::Value;

/// The converted document plus everything noticed along the way.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// The converted document (`Value::Null` when validation short-circuited)
    pub content: Value,
    /// Format of `content`
    pub target_format: SbomFormat,
    /// Non-fatal warnings, in the order they were produced
    pub warnings: Vec<String>,
    /// Structured errors, in the order they were produced
    pub errors: Vec<ConversionError>,
}

impl ConversionResult {
    /// Build a result from converted content and its accumulated diagnostics.
    #[must_use]
    pub fn new(content: Value, target_format: SbomFormat, diagnostics: Diagnostics) -> Self {
        Self {
            content,
            target_format,
            warnings: diagnostics.warnings,
            errors: diagnostics.errors,
        }
    }

    /// Derived success flag: false iff any error is at `Severity::Error` or above.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.errors.iter().any(ConversionError::is_fatal)
    }

    /// Errors with exactly the given severity.
    pub fn errors_with_severity(
        &self,
        severity: Severity,
    ) -> impl Iterator<Item = &ConversionError> + '_ {
        self.errors.iter().filter(move |e| e.severity == severity)
    }

    /// Errors at or above the given severity.
    pub fn errors_at_least(
        &self,
        severity: Severity,
    ) -> impl Iterator<Item = &ConversionError> + '_ {
        self.errors.iter().filter(move |e| e.severity >= severity)
    }

    /// Errors raised by one part of the engine.
    pub fn errors_from(&self, origin: Origin) -> impl Iterator<Item = &ConversionError> + '_ {
        self.errors.iter().filter(move |e| e.origin == origin)
    }

    /// Serializable summary without the converted content.
    #[must_use]
    pub fn summary(&self) -> ConversionSummary<'_> {
        ConversionSummary {
            target_format: self.target_format,
            success: self.success(),
            warnings: &self.warnings,
            errors: &self.errors,
        }
    }
}

/// Report-friendly view of a [`ConversionResult`].
#[derive(Debug, Serialize)]
pub struct ConversionSummary<'a> {
    pub target_format: SbomFormat,
    pub success: bool,
    pub warnings: &'a [String],
    pub errors: &'a [ConversionError],
}

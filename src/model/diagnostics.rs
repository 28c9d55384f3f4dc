//! Warnings and severity-tagged errors produced while converting.
//!
//! Every transform returns its value together with the [`Diagnostics`] it
//! produced, wrapped in an [`Outcome`]. Callers fold those into their own
//! accumulator with [`Diagnostics::absorb`], so nothing is shared between
//! documents and no transform writes into state it does not own.

use indexmap::IndexMap;
use serde::Serialize;
use std::error::Error as StdError;
use std::sync::Arc;

/// Error severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// The part of the engine an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    Validation,
    FieldMapping,
    Entity,
    Relationship,
    License,
    Hash,
    Identifier,
    Orchestrator,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::FieldMapping => "field-mapping",
            Self::Entity => "entity",
            Self::Relationship => "relationship",
            Self::License => "license",
            Self::Hash => "hash",
            Self::Identifier => "identifier",
            Self::Orchestrator => "orchestrator",
        };
        f.write_str(name)
    }
}

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    /// Root of the input is not a JSON object
    InvalidRoot,
    /// A required top-level field is absent
    MissingRequiredField,
    /// The format discriminator has the wrong value
    InvalidDiscriminator,
    /// Input is already in the requested target format
    SameFormat,
    /// A single field could not be transformed
    FieldTransformFailed,
}

impl ErrorCode {
    /// Code string as rendered in reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRoot => "INVALID_ROOT",
            Self::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            Self::InvalidDiscriminator => "INVALID_DISCRIMINATOR",
            Self::SameFormat => "SAME_FORMAT",
            Self::FieldTransformFailed => "FIELD_TRANSFORM_FAILED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured conversion error.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionError {
    pub message: String,
    pub origin: Origin,
    pub context: IndexMap<String, String>,
    pub code: ErrorCode,
    pub severity: Severity,
    #[serde(skip)]
    pub cause: Option<Arc<dyn StdError + Send + Sync>>,
}

impl ConversionError {
    /// Create an error with an empty context.
    pub fn new(
        message: impl Into<String>,
        origin: Origin,
        code: ErrorCode,
        severity: Severity,
    ) -> Self {
        Self {
            message: message.into(),
            origin,
            context: IndexMap::new(),
            code,
            severity,
            cause: None,
        }
    }

    /// Critical validation failure for a missing top-level field.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            format!("Missing required field: {field}"),
            Origin::Validation,
            ErrorCode::MissingRequiredField,
            Severity::Critical,
        )
        .with_context("field", field)
    }

    /// Non-fatal failure while mapping a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::new(
            message,
            Origin::FieldMapping,
            ErrorCode::FieldTransformFailed,
            Severity::Error,
        )
        .with_context("field", field)
    }

    /// Attribute the error to a more specific part of the engine.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Attach a context entry.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Whether this error makes a conversion unsuccessful.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity >= Severity::Error
    }
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.origin, self.message)
    }
}

impl StdError for ConversionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Ordered warnings and errors accumulated by one transform call.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    pub errors: Vec<ConversionError>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record an error.
    pub fn error(&mut self, error: ConversionError) {
        self.errors.push(error);
    }

    /// Append another accumulator, keeping order.
    pub fn merge(&mut self, other: Self) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    /// Take the value out of an outcome, keeping its diagnostics.
    pub fn absorb<T>(&mut self, outcome: Outcome<T>) -> T {
        self.merge(outcome.diagnostics);
        outcome.value
    }

    /// True if any error is at `Severity::Critical`.
    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity == Severity::Critical)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }
}

/// A transform's value together with the diagnostics it produced.
#[derive(Debug, Clone)]
#[must_use]
pub struct Outcome<T> {
    pub value: T,
    pub diagnostics: Diagnostics,
}

impl<T> Outcome<T> {
    pub fn new(value: T, diagnostics: Diagnostics) -> Self {
        Self { value, diagnostics }
    }

    /// An outcome without any warnings or errors.
    pub fn clean(value: T) -> Self {
        Self::new(value, Diagnostics::new())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome::new(f(self.value), self.diagnostics)
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.diagnostics.warnings
    }

    pub fn into_parts(self) -> (T, Diagnostics) {
        (self.value, self.diagnostics)
    }
}

//! **Bidirectional conversion between SPDX 2.x and CycloneDX 1.x SBOMs.**
//!
//! `sbom-convert` reads a JSON SBOM in either format, detects which one it
//! is, and produces the equivalent document in the other format. Fields
//! with a counterpart are mapped, fields without one are reported, and
//! nothing is dropped silently: every conversion returns a
//! [`ConversionResult`] carrying the output document, ordered warnings, and
//! severity-tagged errors.
//!
//! ## Core Concepts & Modules
//!
//! - **[`detection`]**: Scores a parsed document against both formats.
//! - **[`convert`]**: The [`Converter`] facade and the two document-level
//!   orchestrators, [`SpdxToCycloneDx`] and [`CycloneDxToSpdx`].
//! - **[`transform`]**: Stateless field-level transformers for identifiers,
//!   hashes, licenses, entities, and the relationship graph.
//! - **[`model`]**: Diagnostics, graph edges, and the result type.
//! - **[`config`]**: YAML-loadable [`ConverterConfig`].
//!
//! ## Getting Started
//!
//! ```no_run
//! use sbom_convert::{Converter, ConverterConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = Converter::new(&ConverterConfig::default());
//!     let result = converter.convert_file(Path::new("sbom.cdx.json"), None)?;
//!
//!     println!(
//!         "Converted to {} with {} warnings (success: {})",
//!         result.target_format,
//!         result.warnings.len(),
//!         result.success()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! Lower-level pieces are usable on their own:
//!
//! ```
//! use sbom_convert::transform::{HashAlgorithmTransformer, IdentifierTransformer};
//!
//! assert_eq!(IdentifierTransformer::format_as_id("my lib@1.0"), "SPDXRef-my-lib-1.0");
//! assert_eq!(HashAlgorithmTransformer::map_forward("SHA256").value, Some("SHA-256"));
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

pub mod config;
pub mod convert;
pub mod detection;
pub mod error;
pub mod model;
pub mod transform;

// Re-export main types for convenience
pub use config::{ConfigError, ConverterConfig, Validatable};
pub use convert::{Converter, CycloneDxToSpdx, SpdxToCycloneDx};
pub use detection::{DetectionResult, FormatConfidence, FormatDetector};
pub use error::{ConvertError, Result};
pub use model::{
    ConversionError, ConversionResult, ConversionSummary, DependencyEdge, Diagnostics, ErrorCode,
    Origin, Outcome, RelationshipEdge, SbomFormat, Severity,
};

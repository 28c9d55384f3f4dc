//! Document-level conversion between SPDX and `CycloneDX`.
//!
//! [`Converter`] is the entry point: it detects the source format, picks
//! the matching orchestrator, and returns a [`ConversionResult`]. The two
//! orchestrators can also be used directly when the direction is known.
//!
//! ```no_run
//! use sbom_convert::config::ConverterConfig;
//! use sbom_convert::convert::Converter;
//! use std::path::Path;
//!
//! let converter = Converter::new(&ConverterConfig::default());
//! let result = converter.convert_file(Path::new("sbom.spdx.json"), None)?;
//! for warning in &result.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! # Ok::<(), sbom_convert::ConvertError>(())
//! ```

mod cdx_to_spdx;
pub mod document;
mod spdx_to_cdx;

pub use cdx_to_spdx::{CycloneDxToSpdx, SPDX_DATA_LICENSE};
pub use spdx_to_cdx::{SpdxToCycloneDx, DOCUMENT_NAME_PROPERTY};

use crate::config::ConverterConfig;
use crate::detection::{DetectionResult, FormatDetector};
use crate::error::{ConvertError, Result};
use crate::model::{
    ConversionError, ConversionResult, Diagnostics, ErrorCode, Origin, SbomFormat, Severity,
};
use serde_json::Value;
use std::path::Path;

/// Current UTC time as an RFC 3339 timestamp with second precision.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Detects the source format and dispatches to the right orchestrator.
#[derive(Debug, Clone)]
pub struct Converter {
    detector: FormatDetector,
    to_cyclonedx: SpdxToCycloneDx,
    to_spdx: CycloneDxToSpdx,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(&ConverterConfig::default())
    }
}

impl Converter {
    #[must_use]
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            detector: FormatDetector::new(),
            to_cyclonedx: SpdxToCycloneDx::new(config),
            to_spdx: CycloneDxToSpdx::new(config),
        }
    }

    /// Use a non-default detection threshold.
    #[must_use]
    pub fn with_detector(mut self, detector: FormatDetector) -> Self {
        self.detector = detector;
        self
    }

    #[must_use]
    pub fn detect(&self, document: &Value) -> DetectionResult {
        self.detector.detect(document)
    }

    /// Convert into the other format.
    ///
    /// # Errors
    ///
    /// [`ConvertError::UnknownFormat`] if the document is neither SPDX nor
    /// `CycloneDX`.
    pub fn convert(&self, document: &Value) -> Result<ConversionResult> {
        let detection = self.detect(document);
        let Some(source) = detection.format else {
            tracing::warn!(reasons = ?detection.warnings, "Could not detect SBOM format");
            return Err(ConvertError::UnknownFormat);
        };
        tracing::info!(
            "Detected {} (version {}, confidence {:.2})",
            source,
            detection.version.as_deref().unwrap_or("unknown"),
            detection.confidence.value()
        );
        Ok(self.run(source, document))
    }

    /// Convert into `target`, refusing same-format requests.
    ///
    /// An undetectable document or a document already in `target` yields a
    /// result with a critical error and no content.
    pub fn convert_to(&self, document: &Value, target: SbomFormat) -> ConversionResult {
        let detection = self.detect(document);
        let Some(source) = detection.format else {
            let mut diagnostics = Diagnostics::new();
            diagnostics.error(
                ConversionError::new(
                    detection.warnings.join("; "),
                    Origin::Orchestrator,
                    ErrorCode::InvalidRoot,
                    Severity::Critical,
                )
                .with_context("target", target.name()),
            );
            return ConversionResult::new(Value::Null, target, diagnostics);
        };

        if source == target {
            let mut diagnostics = Diagnostics::new();
            diagnostics.error(
                ConversionError::new(
                    format!("Document is already {source}; nothing to convert"),
                    Origin::Orchestrator,
                    ErrorCode::SameFormat,
                    Severity::Critical,
                )
                .with_context("format", source.name()),
            );
            return ConversionResult::new(Value::Null, target, diagnostics);
        }
        self.run(source, document)
    }

    /// Parse JSON text and convert it.
    ///
    /// # Errors
    ///
    /// Malformed JSON, or an undetectable format when `target` is `None`.
    pub fn convert_str(&self, text: &str, target: Option<SbomFormat>) -> Result<ConversionResult> {
        let document: Value =
            serde_json::from_str(text).map_err(|e| ConvertError::json("SBOM input", e))?;
        match target {
            Some(target) => Ok(self.convert_to(&document, target)),
            None => self.convert(&document),
        }
    }

    /// Read, parse, and convert a JSON file.
    ///
    /// # Errors
    ///
    /// IO and JSON failures carry the file path; see [`Self::convert_str`].
    pub fn convert_file(&self, path: &Path, target: Option<SbomFormat>) -> Result<ConversionResult> {
        let text = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        let document: Value = serde_json::from_str(&text)
            .map_err(|e| ConvertError::json(path.display().to_string(), e))?;
        match target {
            Some(target) => Ok(self.convert_to(&document, target)),
            None => self.convert(&document),
        }
    }

    fn run(&self, source: SbomFormat, document: &Value) -> ConversionResult {
        match source {
            SbomFormat::Spdx => self.to_cyclonedx.convert(document),
            SbomFormat::CycloneDx => self.to_spdx.convert(document),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn spdx() -> Value {
        json!({
            "spdxVersion": "SPDX-2.3",
            "dataLicense": "CC0-1.0",
            "SPDXID": "SPDXRef-DOCUMENT",
            "name": "doc",
            "documentNamespace": "https://example.test/doc"
        })
    }

    #[test]
    fn test_now_timestamp_shape() {
        let now = now_timestamp();
        assert_eq!(now.len(), 20);
        assert!(now.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
    }

    #[test]
    fn test_convert_dispatches_on_detection() {
        let result = Converter::default().convert(&spdx()).expect("detected");
        assert_eq!(result.target_format, SbomFormat::CycloneDx);
        assert_eq!(result.content["bomFormat"], "CycloneDX");
    }

    #[test]
    fn test_convert_unknown_format() {
        let err = Converter::default().convert(&json!({"hello": "world"})).unwrap_err();
        assert!(matches!(err, ConvertError::UnknownFormat));
    }

    #[test]
    fn test_convert_to_same_format() {
        let result = Converter::default().convert_to(&spdx(), SbomFormat::Spdx);
        assert!(!result.success());
        assert_eq!(result.content, Value::Null);
        assert_eq!(result.errors[0].code, ErrorCode::SameFormat);
        assert_eq!(result.errors[0].origin, Origin::Orchestrator);
    }

    #[test]
    fn test_convert_to_undetectable() {
        let result = Converter::default().convert_to(&json!([]), SbomFormat::Spdx);
        assert_eq!(result.errors[0].code, ErrorCode::InvalidRoot);
        assert_eq!(result.errors[0].severity, Severity::Critical);
    }

    #[test]
    fn test_convert_str_rejects_bad_json() {
        let err = Converter::default().convert_str("{ nope", None).unwrap_err();
        assert!(matches!(err, ConvertError::Json { .. }));
    }

    #[test]
    fn test_convert_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{}", spdx()).expect("write");

        let result = Converter::default()
            .convert_file(file.path(), Some(SbomFormat::CycloneDx))
            .expect("converted");
        assert!(result.success());

        let missing = Converter::default().convert_file(Path::new("/no/such/sbom.json"), None);
        assert!(matches!(missing, Err(ConvertError::Io { .. })));
    }
}

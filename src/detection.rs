//! Format detection for parsed SBOM documents.
//!
//! Both formats are scored independently and the higher-confidence one
//! wins, provided it clears the threshold. There is no default bias: an
//! ambiguous document is reported as unknown rather than guessed.

use crate::model::SbomFormat;
use serde_json::Value;

/// Minimum confidence threshold for accepting a format detection.
pub const MIN_CONFIDENCE_THRESHOLD: f32 = 0.25;

/// Confidence level for format detection (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct FormatConfidence(f32);

impl FormatConfidence {
    /// Definitely not this format
    pub const NONE: Self = Self(0.0);
    /// Might be this format
    pub const LOW: Self = Self(0.25);
    /// Likely this format
    pub const MEDIUM: Self = Self(0.5);
    /// Almost certainly this format
    pub const HIGH: Self = Self(0.75);
    /// Definitely this format
    pub const CERTAIN: Self = Self(1.0);

    #[must_use]
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    #[must_use]
    pub const fn value(&self) -> f32 {
        self.0
    }
}

/// Result of format detection.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Detected format, if any cleared the threshold
    pub format: Option<SbomFormat>,
    /// Confidence of the winning format
    pub confidence: FormatConfidence,
    /// `spdxVersion` or `specVersion`, when present
    pub version: Option<String>,
    /// Anything odd noticed while scoring
    pub warnings: Vec<String>,
}

impl DetectionResult {
    /// Result indicating no format was detected.
    pub fn unknown(reason: &str) -> Self {
        Self {
            format: None,
            confidence: FormatConfidence::NONE,
            version: None,
            warnings: vec![reason.to_string()],
        }
    }

    fn detected(format: SbomFormat, score: Score) -> Self {
        Self {
            format: Some(format),
            confidence: score.confidence,
            version: score.version,
            warnings: score.warnings,
        }
    }
}

/// Per-format score before selection.
#[derive(Debug, Default)]
struct Score {
    confidence: FormatConfidence,
    version: Option<String>,
    warnings: Vec<String>,
}

impl Score {
    fn new(confidence: FormatConfidence, version: Option<&str>) -> Self {
        Self {
            confidence,
            version: version.map(str::to_string),
            warnings: Vec::new(),
        }
    }

    fn warning(mut self, message: &str) -> Self {
        self.warnings.push(message.to_string());
        self
    }
}

/// Scores a document against both formats.
#[derive(Debug, Clone, Copy)]
pub struct FormatDetector {
    min_confidence: f32,
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDetector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_confidence: MIN_CONFIDENCE_THRESHOLD,
        }
    }

    /// Create a format detector with a custom confidence threshold.
    #[must_use]
    pub fn with_threshold(min_confidence: f32) -> Self {
        Self {
            min_confidence: min_confidence.clamp(0.0, 1.0),
        }
    }

    /// Detect the format of a parsed document.
    #[must_use]
    pub fn detect(&self, document: &Value) -> DetectionResult {
        if !document.is_object() {
            return DetectionResult::unknown("Document root is not a JSON object");
        }
        let cdx = score_cyclonedx(document);
        let spdx = score_spdx(document);
        self.select_best(cdx, spdx)
    }

    fn select_best(&self, cdx: Score, spdx: Score) -> DetectionResult {
        let cdx_conf = cdx.confidence.value();
        let spdx_conf = spdx.confidence.value();

        tracing::debug!(
            "Format detection: CycloneDX={:.2}, SPDX={:.2}, threshold={:.2}",
            cdx_conf,
            spdx_conf,
            self.min_confidence
        );

        if cdx_conf >= self.min_confidence && cdx_conf > spdx_conf {
            DetectionResult::detected(SbomFormat::CycloneDx, cdx)
        } else if spdx_conf >= self.min_confidence && spdx_conf > cdx_conf {
            DetectionResult::detected(SbomFormat::Spdx, spdx)
        } else {
            let mut result =
                DetectionResult::unknown("Could not detect SBOM format with sufficient confidence");
            if cdx_conf > 0.0 {
                result.warnings.push(format!(
                    "CycloneDX detection: {:.0}% confidence (threshold: {:.0}%)",
                    cdx_conf * 100.0,
                    self.min_confidence * 100.0
                ));
            }
            if spdx_conf > 0.0 {
                result.warnings.push(format!(
                    "SPDX detection: {:.0}% confidence (threshold: {:.0}%)",
                    spdx_conf * 100.0,
                    self.min_confidence * 100.0
                ));
            }
            result
        }
    }
}

fn str_at<'a>(document: &'a Value, field: &str) -> Option<&'a str> {
    document.get(field).and_then(Value::as_str)
}

fn score_cyclonedx(document: &Value) -> Score {
    let version = str_at(document, "specVersion");
    let schema_mentions_cdx = str_at(document, "$schema")
        .is_some_and(|s| s.to_ascii_lowercase().contains("cyclonedx"));

    match str_at(document, "bomFormat") {
        Some("CycloneDX") => Score::new(FormatConfidence::CERTAIN, version),
        Some(_) => Score::new(FormatConfidence::MEDIUM, version)
            .warning("bomFormat is present but is not \"CycloneDX\""),
        None if schema_mentions_cdx => Score::new(FormatConfidence::HIGH, version),
        None if version.is_some() && document.get("components").is_some() => {
            Score::new(FormatConfidence::MEDIUM, version)
                .warning("Missing bomFormat field - might not be CycloneDX")
        }
        None => Score::default(),
    }
}

fn score_spdx(document: &Value) -> Score {
    let version = str_at(document, "spdxVersion");
    match version {
        Some(v) if v.starts_with("SPDX-") => Score::new(FormatConfidence::CERTAIN, version),
        Some(_) => Score::new(FormatConfidence::HIGH, version)
            .warning("spdxVersion does not start with \"SPDX-\""),
        None if str_at(document, "SPDXID").is_some() => Score::new(FormatConfidence::MEDIUM, None)
            .warning("Missing spdxVersion field - might not be SPDX"),
        None if document.get("packages").is_some() && document.get("relationships").is_some() => {
            Score::new(FormatConfidence::LOW, None)
        }
        None => Score::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_cyclonedx() {
        let result = FormatDetector::new().detect(&json!({"bomFormat": "CycloneDX", "specVersion": "1.5"}));
        assert_eq!(result.format, Some(SbomFormat::CycloneDx));
        assert_eq!(result.confidence, FormatConfidence::CERTAIN);
        assert_eq!(result.version.as_deref(), Some("1.5"));
    }

    #[test]
    fn test_detect_spdx() {
        let result = FormatDetector::new().detect(&json!({"spdxVersion": "SPDX-2.3", "SPDXID": "SPDXRef-DOCUMENT"}));
        assert_eq!(result.format, Some(SbomFormat::Spdx));
        assert_eq!(result.version.as_deref(), Some("SPDX-2.3"));
    }

    #[test]
    fn test_wrong_discriminator_still_detected() {
        let result = FormatDetector::new().detect(&json!({"bomFormat": "Other", "specVersion": "1.5"}));
        assert_eq!(result.format, Some(SbomFormat::CycloneDx));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_non_object_root() {
        let result = FormatDetector::new().detect(&json!([1, 2]));
        assert_eq!(result.format, None);
        assert_eq!(result.warnings, ["Document root is not a JSON object"]);
    }

    #[test]
    fn test_ambiguous_is_unknown() {
        let both = json!({"bomFormat": "CycloneDX", "spdxVersion": "SPDX-2.3"});
        assert_eq!(FormatDetector::new().detect(&both).format, None);
        assert_eq!(FormatDetector::new().detect(&json!({"name": "x"})).format, None);
    }

    #[test]
    fn test_threshold_is_respected() {
        let weak = json!({"packages": [], "relationships": []});
        assert_eq!(FormatDetector::new().detect(&weak).format, Some(SbomFormat::Spdx));
        assert_eq!(FormatDetector::with_threshold(0.5).detect(&weak).format, None);
    }
}

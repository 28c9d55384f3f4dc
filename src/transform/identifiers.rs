//! SPDX element identifiers, generated references, and spec version mapping.
//!
//! SPDX requires every element id to look like `SPDXRef-<idstring>` where
//! `<idstring>` only contains letters, digits, `.` and `-`. `CycloneDX`
//! `bom-ref` values are free-form, so converting between the two means
//! sanitizing on the way in and stripping the prefix on the way out.

use crate::config::VersionConfig;
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

/// Canonical prefix of SPDX element identifiers.
pub const SPDX_REF_PREFIX: &str = "SPDXRef-";

/// Identifier of the SPDX document itself.
pub const SPDX_DOCUMENT_ID: &str = "SPDXRef-DOCUMENT";

static VALID_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^SPDXRef-[A-Za-z0-9.\-]+$").expect("identifier pattern is valid")
});

/// Bidirectional SPDX version ⇄ `CycloneDX` spec version table.
const VERSION_TABLE: &[(&str, &str)] = &[
    ("SPDX-2.1", "1.3"),
    ("SPDX-2.2", "1.4"),
    ("SPDX-2.3", "1.5"),
];

/// Formats, validates, and generates element identifiers.
#[derive(Debug, Clone, Default)]
pub struct IdentifierTransformer {
    versions: VersionConfig,
}

impl IdentifierTransformer {
    pub fn new(versions: VersionConfig) -> Self {
        Self { versions }
    }

    /// Whether `id` is a well-formed SPDX element identifier.
    #[must_use]
    pub fn is_valid(id: &str) -> bool {
        VALID_ID.is_match(id)
    }

    /// Turn any string into a valid-looking SPDX element identifier.
    ///
    /// Canonical input is returned unchanged, prefixed input only has its
    /// suffix sanitized, anything else is sanitized whole and prefixed.
    /// Applying this twice gives the same result as applying it once.
    #[must_use]
    pub fn format_as_id(raw: &str) -> String {
        if Self::is_valid(raw) {
            return raw.to_string();
        }
        match raw.strip_prefix(SPDX_REF_PREFIX) {
            Some(suffix) => format!("{SPDX_REF_PREFIX}{}", sanitize(suffix)),
            None => format!("{SPDX_REF_PREFIX}{}", sanitize(raw)),
        }
    }

    /// Remove the SPDX prefix if present.
    #[must_use]
    pub fn strip_prefix(id: &str) -> &str {
        id.strip_prefix(SPDX_REF_PREFIX).unwrap_or(id)
    }

    /// A fresh reference string: `prefix` followed by a random v4 UUID.
    ///
    /// Uniqueness is probabilistic; two calls could in principle collide.
    #[must_use]
    pub fn generate_reference(prefix: Option<&str>) -> String {
        format!("{}{}", prefix.unwrap_or_default(), Uuid::new_v4())
    }

    /// Short random hex suffix for synthesized names and ids.
    #[must_use]
    pub fn short_suffix() -> String {
        let simple = Uuid::new_v4().simple().to_string();
        simple[..8].to_string()
    }

    /// SPDX version → `CycloneDX` spec version.
    ///
    /// Versions outside the table collapse to the configured latest
    /// `CycloneDX` version.
    #[must_use]
    pub fn spdx_to_cyclonedx_version(&self, spdx_version: &str) -> String {
        VERSION_TABLE
            .iter()
            .find(|(spdx, _)| *spdx == spdx_version)
            .map_or_else(
                || self.versions.latest_cyclonedx.clone(),
                |(_, cdx)| (*cdx).to_string(),
            )
    }

    /// `CycloneDX` spec version → SPDX version.
    ///
    /// Versions outside the table collapse to the configured latest SPDX
    /// version.
    #[must_use]
    pub fn cyclonedx_to_spdx_version(&self, spec_version: &str) -> String {
        VERSION_TABLE
            .iter()
            .find(|(_, cdx)| *cdx == spec_version)
            .map_or_else(
                || self.versions.latest_spdx.clone(),
                |(spdx, _)| (*spdx).to_string(),
            )
    }
}

/// Replace every character outside `[A-Za-z0-9.-]` with `-`.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_unchanged() {
        assert_eq!(
            IdentifierTransformer::format_as_id("SPDXRef-Package-lodash"),
            "SPDXRef-Package-lodash"
        );
    }

    #[test]
    fn test_prefixed_suffix_sanitized() {
        assert_eq!(
            IdentifierTransformer::format_as_id("SPDXRef-pkg:npm/lodash@4"),
            "SPDXRef-pkg-npm-lodash-4"
        );
    }

    #[test]
    fn test_unprefixed_sanitized_and_prefixed() {
        assert_eq!(
            IdentifierTransformer::format_as_id("pkg:npm/@scope/name@1.0.0"),
            "SPDXRef-pkg-npm--scope-name-1.0.0"
        );
        assert_eq!(IdentifierTransformer::format_as_id("lodash"), "SPDXRef-lodash");
    }

    #[test]
    fn test_format_idempotent_on_edge_cases() {
        for raw in ["", "SPDXRef-", "SPDXRef-SPDXRef-x", "ü/ñ", "a b c"] {
            let once = IdentifierTransformer::format_as_id(raw);
            assert_eq!(IdentifierTransformer::format_as_id(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_is_valid() {
        assert!(IdentifierTransformer::is_valid("SPDXRef-DOCUMENT"));
        assert!(IdentifierTransformer::is_valid("SPDXRef-a.b-1"));
        assert!(!IdentifierTransformer::is_valid("SPDXRef-"));
        assert!(!IdentifierTransformer::is_valid("SPDXRef-a_b"));
        assert!(!IdentifierTransformer::is_valid("lodash"));
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(IdentifierTransformer::strip_prefix("SPDXRef-lodash"), "lodash");
        assert_eq!(IdentifierTransformer::strip_prefix("lodash"), "lodash");
        let once = IdentifierTransformer::strip_prefix("SPDXRef-x");
        assert_eq!(IdentifierTransformer::strip_prefix(once), "x");
    }

    #[test]
    fn test_generate_reference() {
        let plain = IdentifierTransformer::generate_reference(None);
        assert_eq!(plain.len(), 36);
        assert!(Uuid::parse_str(&plain).is_ok());

        let prefixed = IdentifierTransformer::generate_reference(Some(SPDX_REF_PREFIX));
        assert!(IdentifierTransformer::is_valid(&prefixed));
        assert_ne!(
            IdentifierTransformer::generate_reference(None),
            IdentifierTransformer::generate_reference(None)
        );
    }

    #[test]
    fn test_version_table() {
        let ids = IdentifierTransformer::default();
        assert_eq!(ids.spdx_to_cyclonedx_version("SPDX-2.3"), "1.5");
        assert_eq!(ids.spdx_to_cyclonedx_version("SPDX-2.2"), "1.4");
        assert_eq!(ids.cyclonedx_to_spdx_version("1.4"), "SPDX-2.2");
    }

    #[test]
    fn test_version_fallback_is_lossy() {
        let ids = IdentifierTransformer::default();
        assert_eq!(ids.spdx_to_cyclonedx_version("SPDX-3.0"), "1.6");
        assert_eq!(ids.cyclonedx_to_spdx_version("1.6"), "SPDX-2.3");
        assert_eq!(ids.cyclonedx_to_spdx_version("garbage"), "SPDX-2.3");
    }

    #[test]
    fn test_version_fallback_follows_config() {
        let ids = IdentifierTransformer::new(VersionConfig {
            latest_spdx: "SPDX-2.2".to_string(),
            latest_cyclonedx: "1.4".to_string(),
        });
        assert_eq!(ids.spdx_to_cyclonedx_version("SPDX-9"), "1.4");
        assert_eq!(ids.cyclonedx_to_spdx_version("2.0"), "SPDX-2.2");
    }
}

//! Hash algorithm name mapping between SPDX checksums and `CycloneDX` hashes.
//!
//! SPDX spells algorithms `SHA256`, `BLAKE2b-256`; `CycloneDX` spells them
//! `SHA-256`, `BLAKE2b-256`. Lookups are case-insensitive and ignore dashes
//! so either spelling (and lowercase variants seen in the wild) resolves.
//! Algorithms outside the table are dropped with a warning rather than
//! passed through under a name the target format would reject.

use crate::model::Outcome;
use serde_json::{json, Map, Value};

/// `(SPDX name, CycloneDX name)` pairs.
const HASH_ALGORITHMS: &[(&str, &str)] = &[
    ("SHA1", "SHA-1"),
    ("SHA224", "SHA-224"),
    ("SHA256", "SHA-256"),
    ("SHA384", "SHA-384"),
    ("SHA512", "SHA-512"),
    ("SHA3-224", "SHA3-224"),
    ("SHA3-256", "SHA3-256"),
    ("SHA3-384", "SHA3-384"),
    ("SHA3-512", "SHA3-512"),
    ("BLAKE2b-256", "BLAKE2b-256"),
    ("BLAKE2b-384", "BLAKE2b-384"),
    ("BLAKE2b-512", "BLAKE2b-512"),
    ("BLAKE3", "BLAKE3"),
    ("MD5", "MD5"),
];

/// Lookup key: uppercase with dashes (and underscores) removed.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Which direction a conversion runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// SPDX checksum → `CycloneDX` hash
    Forward,
    /// `CycloneDX` hash → SPDX checksum
    Backward,
}

impl Direction {
    /// `(algorithm field, value field)` read from the source entry.
    const fn source_fields(self) -> (&'static str, &'static str) {
        match self {
            Self::Forward => ("algorithm", "checksumValue"),
            Self::Backward => ("alg", "content"),
        }
    }

    /// `(algorithm field, value field)` written to the target entry.
    const fn target_fields(self) -> (&'static str, &'static str) {
        match self {
            Self::Forward => ("alg", "content"),
            Self::Backward => ("algorithm", "checksumValue"),
        }
    }
}

/// Bidirectional hash algorithm lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashAlgorithmTransformer;

impl HashAlgorithmTransformer {
    /// SPDX algorithm name → `CycloneDX` algorithm name.
    pub fn map_forward(name: &str) -> Outcome<Option<&'static str>> {
        Self::lookup(name, |(spdx, cdx)| (spdx, cdx))
    }

    /// `CycloneDX` algorithm name → SPDX algorithm name.
    pub fn map_backward(name: &str) -> Outcome<Option<&'static str>> {
        Self::lookup(name, |(spdx, cdx)| (cdx, spdx))
    }

    fn lookup(
        name: &str,
        pick: impl Fn((&'static str, &'static str)) -> (&'static str, &'static str),
    ) -> Outcome<Option<&'static str>> {
        let key = normalize(name);
        let found = HASH_ALGORITHMS
            .iter()
            .map(|pair| pick(*pair))
            .find(|(from, _)| normalize(from) == key)
            .map(|(_, to)| to);

        let mut outcome = Outcome::clean(found);
        if found.is_none() {
            outcome
                .diagnostics
                .warn(format!("Unsupported hash algorithm: {name}"));
        }
        outcome
    }

    /// Convert one SPDX checksum object into a `CycloneDX` hash object.
    pub fn convert_entry_forward(entry: &Value) -> Outcome<Option<Value>> {
        Self::convert_entry(entry, Direction::Forward)
    }

    /// Convert one `CycloneDX` hash object into an SPDX checksum object.
    pub fn convert_entry_backward(entry: &Value) -> Outcome<Option<Value>> {
        Self::convert_entry(entry, Direction::Backward)
    }

    fn convert_entry(entry: &Value, direction: Direction) -> Outcome<Option<Value>> {
        let (alg_field, value_field) = direction.source_fields();
        let mut outcome = Outcome::clean(None);

        let algorithm = entry.get(alg_field).and_then(Value::as_str);
        let digest = entry.get(value_field).and_then(Value::as_str);
        let (Some(algorithm), Some(digest)) = (algorithm, digest) else {
            let missing = if algorithm.is_none() {
                alg_field
            } else {
                value_field
            };
            outcome
                .diagnostics
                .warn(format!("Hash entry missing required field: {missing}"));
            return outcome;
        };

        let mapped = match direction {
            Direction::Forward => Self::map_forward(algorithm),
            Direction::Backward => Self::map_backward(algorithm),
        };
        let Some(target_alg) = outcome.diagnostics.absorb(mapped) else {
            return outcome;
        };

        let (out_alg, out_value) = direction.target_fields();
        let mut converted = Map::new();
        converted.insert(out_alg.to_string(), json!(target_alg));
        converted.insert(out_value.to_string(), json!(digest));
        outcome.value = Some(Value::Object(converted));
        outcome
    }

    /// Convert a list of SPDX checksums; unsupported entries are dropped.
    pub fn convert_list_forward(entries: &[Value]) -> Outcome<Vec<Value>> {
        Self::convert_list(entries, Direction::Forward)
    }

    /// Convert a list of `CycloneDX` hashes; unsupported entries are dropped.
    pub fn convert_list_backward(entries: &[Value]) -> Outcome<Vec<Value>> {
        Self::convert_list(entries, Direction::Backward)
    }

    fn convert_list(entries: &[Value], direction: Direction) -> Outcome<Vec<Value>> {
        let mut outcome = Outcome::clean(Vec::with_capacity(entries.len()));
        for entry in entries {
            let converted = Self::convert_entry(entry, direction);
            if let Some(value) = outcome.diagnostics.absorb(converted) {
                outcome.value.push(value);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_fourteen_algorithms() {
        assert!(HASH_ALGORITHMS.len() >= 14);
    }

    #[test]
    fn test_forward_lookup_normalizes() {
        assert_eq!(HashAlgorithmTransformer::map_forward("SHA256").value, Some("SHA-256"));
        assert_eq!(HashAlgorithmTransformer::map_forward("sha-256").value, Some("SHA-256"));
        assert_eq!(
            HashAlgorithmTransformer::map_forward("blake2b-512").value,
            Some("BLAKE2b-512")
        );
    }

    #[test]
    fn test_round_trip_every_algorithm() {
        for (spdx, _) in HASH_ALGORITHMS {
            let forward = HashAlgorithmTransformer::map_forward(spdx).value.expect("mapped");
            let back = HashAlgorithmTransformer::map_backward(forward).value;
            assert_eq!(back, Some(*spdx));
        }
    }

    #[test]
    fn test_unknown_algorithm_warns() {
        let outcome = HashAlgorithmTransformer::map_forward("FOO");
        assert_eq!(outcome.value, None);
        assert_eq!(outcome.warnings(), ["Unsupported hash algorithm: FOO"]);
    }

    #[test]
    fn test_sha3_not_confused_with_sha() {
        assert_eq!(
            HashAlgorithmTransformer::map_forward("SHA3-256").value,
            Some("SHA3-256")
        );
        assert_eq!(HashAlgorithmTransformer::map_backward("SHA-384").value, Some("SHA384"));
    }

    #[test]
    fn test_convert_entry_forward() {
        let entry = json!({"algorithm": "SHA1", "checksumValue": "abc"});
        let outcome = HashAlgorithmTransformer::convert_entry_forward(&entry);
        assert_eq!(outcome.value, Some(json!({"alg": "SHA-1", "content": "abc"})));
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_convert_entry_missing_field() {
        let entry = json!({"alg": "SHA-1"});
        let outcome = HashAlgorithmTransformer::convert_entry_backward(&entry);
        assert_eq!(outcome.value, None);
        assert_eq!(outcome.warnings(), ["Hash entry missing required field: content"]);
    }

    #[test]
    fn test_convert_list_shrinks() {
        let entries = vec![
            json!({"alg": "SHA-256", "content": "aa"}),
            json!({"alg": "FOO", "content": "bb"}),
            json!({"content": "cc"}),
        ];
        let outcome = HashAlgorithmTransformer::convert_list_backward(&entries);
        assert_eq!(
            outcome.value,
            vec![json!({"algorithm": "SHA256", "checksumValue": "aa"})]
        );
        assert_eq!(outcome.warnings().len(), 2);
    }
}

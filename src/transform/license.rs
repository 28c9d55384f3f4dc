//! License string ⇄ license list conversion.
//!
//! SPDX carries a single license expression string per field, `CycloneDX` a
//! list of `{"license": {"id"|"name"}}` or `{"expression"}` objects. Boolean
//! expressions are only recognised syntactically and always carried as
//! verbatim text; nothing here evaluates them.

use crate::model::{Entity, Outcome};
use serde_json::{json, Value};

/// SPDX "no assertion" sentinel.
pub const NOASSERTION: &str = "NOASSERTION";

/// SPDX "no license" sentinel.
pub const NONE: &str = "NONE";

/// Operators that mark a string as a compound expression.
const EXPRESSION_OPERATORS: &[&str] = &[" AND ", " OR ", " WITH "];

#[derive(Debug, Clone, Copy, Default)]
pub struct LicenseTransformer;

impl LicenseTransformer {
    /// Whether `value` is a compound license expression rather than a single id.
    #[must_use]
    pub fn is_expression(value: &str) -> bool {
        value.contains('(')
            || value.contains(')')
            || EXPRESSION_OPERATORS.iter().any(|op| value.contains(op))
    }

    /// Whether `value` carries no license information.
    #[must_use]
    pub fn is_sentinel(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty() || trimmed == NOASSERTION || trimmed == NONE
    }

    /// SPDX license string → `CycloneDX` license list.
    #[must_use]
    pub fn transform_forward(value: &str) -> Vec<Value> {
        if Self::is_sentinel(value) {
            return Vec::new();
        }
        let value = value.trim();
        if Self::is_expression(value) {
            vec![json!({ "expression": value })]
        } else {
            vec![json!({ "license": { "id": value } })]
        }
    }

    /// `CycloneDX` license list → SPDX license string.
    ///
    /// The first `expression` entry wins outright: anything before or after
    /// it is ignored. Several id/name entries become `(A OR B)`.
    pub fn transform_backward(entries: &[Value]) -> Outcome<String> {
        let mut outcome = Outcome::clean(NOASSERTION.to_string());
        let mut tokens: Vec<&str> = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            if let Some(expression) = entry.get("expression").and_then(Value::as_str) {
                outcome.value = expression.to_string();
                return outcome;
            }

            let license = entry.get("license").unwrap_or(entry);
            let token = license
                .get("id")
                .and_then(Value::as_str)
                .or_else(|| license.get("name").and_then(Value::as_str))
                .filter(|s| !s.is_empty());
            match token {
                Some(token) => tokens.push(token),
                None => outcome.diagnostics.warn(format!(
                    "License entry {index} has no id, name, or expression; skipped"
                )),
            }
        }

        outcome.value = match tokens.as_slice() {
            [] => NOASSERTION.to_string(),
            [single] => (*single).to_string(),
            many => format!("({})", many.join(" OR ")),
        };
        outcome
    }

    /// Set `field` only if the entity has no non-empty value for it yet.
    ///
    /// Returns whether the value was written.
    pub fn add_if_absent(entity: &mut Entity, field: &str, value: Value) -> bool {
        let present = entity.get(field).is_some_and(|existing| match existing {
            Value::Null => false,
            Value::Array(items) => !items.is_empty(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        });
        if present {
            return false;
        }
        entity.insert(field.to_string(), value);
        true
    }

    /// Always set `primary`; set `secondary` only if it is still unset.
    pub fn add_dual(entity: &mut Entity, primary: &str, secondary: &str, value: &str) {
        entity.insert(primary.to_string(), json!(value));
        Self::add_if_absent(entity, secondary, json!(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_id_round_trip() {
        let forward = LicenseTransformer::transform_forward("MIT");
        assert_eq!(forward, vec![json!({"license": {"id": "MIT"}})]);

        let back = LicenseTransformer::transform_backward(&forward);
        assert_eq!(back.value, "MIT");
        assert!(back.diagnostics.is_empty());
    }

    #[test]
    fn test_sentinels_forward_to_empty() {
        for sentinel in ["NOASSERTION", "NONE", "", "   "] {
            assert!(LicenseTransformer::transform_forward(sentinel).is_empty());
        }
    }

    #[test]
    fn test_empty_backward_is_noassertion() {
        assert_eq!(LicenseTransformer::transform_backward(&[]).value, "NOASSERTION");
    }

    #[test]
    fn test_expression_detection() {
        for expr in [
            "MIT OR Apache-2.0",
            "GPL-2.0-only WITH Classpath-exception-2.0",
            "(MIT)",
            "MIT AND BSD-3-Clause",
        ] {
            assert!(LicenseTransformer::is_expression(expr), "{expr}");
            assert_eq!(
                LicenseTransformer::transform_forward(expr),
                vec![json!({ "expression": expr })]
            );
        }
        // Operators are only recognised as whole words
        assert!(!LicenseTransformer::is_expression("ORACLE-LICENSE"));
        assert!(!LicenseTransformer::is_expression("MIT-ANDROID"));
    }

    #[test]
    fn test_expression_preserved_verbatim() {
        let text = "(MIT OR Apache-2.0) AND BSD-2-Clause";
        let forward = LicenseTransformer::transform_forward(text);
        assert_eq!(LicenseTransformer::transform_backward(&forward).value, text);
    }

    #[test]
    fn test_multiple_ids_or_grouped() {
        let entries = vec![
            json!({"license": {"id": "MIT"}}),
            json!({"license": {"name": "Custom License"}}),
        ];
        assert_eq!(
            LicenseTransformer::transform_backward(&entries).value,
            "(MIT OR Custom License)"
        );
    }

    #[test]
    fn test_first_expression_short_circuits() {
        let entries = vec![
            json!({"license": {"id": "MIT"}}),
            json!({"expression": "Apache-2.0 OR MIT"}),
            json!({"expression": "GPL-3.0-only"}),
        ];
        assert_eq!(
            LicenseTransformer::transform_backward(&entries).value,
            "Apache-2.0 OR MIT"
        );
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let entries = vec![json!({"license": {}}), json!({"license": {"id": "ISC"}})];
        let outcome = LicenseTransformer::transform_backward(&entries);
        assert_eq!(outcome.value, "ISC");
        assert_eq!(outcome.warnings().len(), 1);
        assert!(outcome.warnings()[0].contains("License entry 0"));
    }

    #[test]
    fn test_add_if_absent_never_overwrites() {
        let mut entity = Entity::new();
        assert!(LicenseTransformer::add_if_absent(&mut entity, "licenses", json!(["a"])));
        assert!(!LicenseTransformer::add_if_absent(&mut entity, "licenses", json!(["b"])));
        assert_eq!(entity["licenses"], json!(["a"]));

        let mut empty = Entity::new();
        empty.insert("licenses".into(), json!([]));
        assert!(LicenseTransformer::add_if_absent(&mut empty, "licenses", json!(["c"])));
    }

    #[test]
    fn test_add_dual() {
        let mut entity = Entity::new();
        entity.insert("licenseDeclared".into(), json!("Apache-2.0"));
        LicenseTransformer::add_dual(&mut entity, "licenseConcluded", "licenseDeclared", "MIT");

        assert_eq!(entity["licenseConcluded"], "MIT");
        assert_eq!(entity["licenseDeclared"], "Apache-2.0");

        let mut fresh = Entity::new();
        LicenseTransformer::add_dual(&mut fresh, "licenseConcluded", "licenseDeclared", "MIT");
        assert_eq!(fresh["licenseDeclared"], "MIT");
    }
}

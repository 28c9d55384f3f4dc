//! SPDX party strings: `Person: Jane Doe (jane@example.com)`,
//! `Organization: Acme`, `Tool: scanner-1.2`.

use super::license::LicenseTransformer;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyKind {
    Person,
    Organization,
    Tool,
}

impl PartyKind {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Organization => "Organization",
            Self::Tool => "Tool",
        }
    }
}

/// A parsed party string borrowing from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Party<'a> {
    pub kind: Option<PartyKind>,
    pub name: &'a str,
    pub email: Option<&'a str>,
}

impl<'a> Party<'a> {
    /// Parse a party string. Sentinels and empty names yield `None`.
    ///
    /// A string without a recognised `Kind:` prefix is taken as a bare name.
    #[must_use]
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.trim();
        if LicenseTransformer::is_sentinel(text) {
            return None;
        }

        let (kind, rest) = [PartyKind::Person, PartyKind::Organization, PartyKind::Tool]
            .into_iter()
            .find_map(|kind| {
                text.strip_prefix(kind.prefix())
                    .and_then(|rest| rest.strip_prefix(':'))
                    .map(|rest| (Some(kind), rest.trim()))
            })
            .unwrap_or((None, text));

        let (name, email) = match rest.strip_suffix(')').and_then(|r| r.rsplit_once('(')) {
            Some((name, email)) => (name.trim(), Some(email.trim()).filter(|e| !e.is_empty())),
            None => (rest, None),
        };
        if name.is_empty() {
            return None;
        }
        Some(Self { kind, name, email })
    }

    /// `CycloneDX` organizational entity: `{"name", "contact"?}`.
    #[must_use]
    pub fn to_organization(&self) -> Value {
        match self.email {
            Some(email) => json!({ "name": self.name, "contact": [{ "email": email }] }),
            None => json!({ "name": self.name }),
        }
    }

    /// `CycloneDX` organizational contact: `{"name", "email"?}`.
    #[must_use]
    pub fn to_contact(&self) -> Value {
        match self.email {
            Some(email) => json!({ "name": self.name, "email": email }),
            None => json!({ "name": self.name }),
        }
    }
}

/// Format an SPDX party string.
#[must_use]
pub fn format_party(kind: PartyKind, name: &str, email: Option<&str>) -> String {
    match email {
        Some(email) => format!("{}: {name} ({email})", kind.prefix()),
        None => format!("{}: {name}", kind.prefix()),
    }
}

/// Read a `CycloneDX` organizational entity or contact back into name/email.
#[must_use]
pub fn entity_name_email(value: &Value) -> Option<(&str, Option<&str>)> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.trim().is_empty())?;
    let email = value.get("email").and_then(Value::as_str).or_else(|| {
        value
            .get("contact")
            .and_then(Value::as_array)
            .and_then(|contacts| contacts.iter().find_map(|c| c.get("email")))
            .and_then(Value::as_str)
    });
    Some((name, email))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixed() {
        let party = Party::parse("Organization: Acme Corp (ops@acme.test)").unwrap();
        assert_eq!(party.kind, Some(PartyKind::Organization));
        assert_eq!(party.name, "Acme Corp");
        assert_eq!(party.email, Some("ops@acme.test"));

        let tool = Party::parse("Tool: syft-0.100.0").unwrap();
        assert_eq!(tool.kind, Some(PartyKind::Tool));
        assert_eq!(tool.name, "syft-0.100.0");
        assert_eq!(tool.email, None);
    }

    #[test]
    fn test_parse_bare_and_sentinel() {
        assert_eq!(Party::parse("Jane").map(|p| p.kind), Some(None));
        assert!(Party::parse("NOASSERTION").is_none());
        assert!(Party::parse("Person: ").is_none());
        assert!(Party::parse("Person: ()").is_none());
    }

    #[test]
    fn test_organization_round_trip() {
        let party = Party::parse("Organization: Acme (a@b.c)").unwrap();
        let value = party.to_organization();
        let (name, email) = entity_name_email(&value).unwrap();
        assert_eq!(
            format_party(PartyKind::Organization, name, email),
            "Organization: Acme (a@b.c)"
        );
    }

    #[test]
    fn test_contact_shape() {
        let party = Party::parse("Person: Jane Doe").unwrap();
        assert_eq!(party.to_contact(), json!({"name": "Jane Doe"}));
    }
}

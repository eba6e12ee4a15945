//! Generic attribute bag decoded from directory search entries
//!
//! LDAP search results are flat multi-valued attribute maps. The adapter
//! crate converts each `SearchEntry` into an [`AttributeBag`]; entity decode
//! functions consume the bag through typed accessors so every "first value
//! or nothing" rule is in one place instead of scattered per call site.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single raw name/value pair preserved for display purposes.
///
/// Multi-valued attributes keep only their first value here; callers that
/// need all values go through [`AttributeBag::all`] before decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttribute {
    pub name: String,
    pub value: String,
}

/// String-keyed multi-value attribute map plus the entry's distinguished name.
///
/// The distinguished name is carried separately because it is the true
/// primary key for mutations and is always present on a search entry, while
/// every other attribute is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeBag {
    dn: String,
    attrs: BTreeMap<String, Vec<String>>,
}

impl AttributeBag {
    /// Creates a bag from a distinguished name and an attribute map.
    pub fn new(
        dn: impl Into<String>,
        attrs: impl IntoIterator<Item = (String, Vec<String>)>,
    ) -> Self {
        Self {
            dn: dn.into(),
            attrs: attrs.into_iter().collect(),
        }
    }

    /// The entry's distinguished name.
    pub fn dn(&self) -> &str {
        &self.dn
    }

    /// First value of an attribute, if the attribute is present and non-empty.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// All values of an attribute; empty slice when absent.
    pub fn all(&self, name: &str) -> &[String] {
        self.attrs.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value parsed as an integer; `None` on absence or garbage.
    pub fn first_i64(&self, name: &str) -> Option<i64> {
        self.first(name).and_then(|v| v.parse().ok())
    }

    /// Whether the attribute is present with at least one non-empty value.
    pub fn has(&self, name: &str) -> bool {
        self.first(name).is_some()
    }

    /// All attributes as display pairs (first value each), sorted by name.
    pub fn pairs(&self) -> Vec<RawAttribute> {
        self.attrs
            .iter()
            .filter_map(|(name, values)| {
                values.first().filter(|v| !v.is_empty()).map(|value| RawAttribute {
                    name: name.clone(),
                    value: value.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag() -> AttributeBag {
        AttributeBag::new(
            "CN=Alice,OU=Staff,DC=example,DC=com",
            [
                ("sAMAccountName".to_string(), vec!["alice".to_string()]),
                (
                    "memberOf".to_string(),
                    vec![
                        "CN=Engineers,DC=example,DC=com".to_string(),
                        "CN=Staff,DC=example,DC=com".to_string(),
                    ],
                ),
                ("pwdLastSet".to_string(), vec!["133497504000000000".to_string()]),
                ("mail".to_string(), vec![String::new()]),
            ],
        )
    }

    #[test]
    fn test_first_returns_first_value() {
        assert_eq!(bag().first("sAMAccountName"), Some("alice"));
    }

    #[test]
    fn test_first_empty_string_is_absent() {
        // Directory servers sometimes return present-but-empty attributes
        assert_eq!(bag().first("mail"), None);
        assert!(!bag().has("mail"));
    }

    #[test]
    fn test_all_values() {
        assert_eq!(bag().all("memberOf").len(), 2);
        assert!(bag().all("nonexistent").is_empty());
    }

    #[test]
    fn test_first_i64() {
        assert_eq!(bag().first_i64("pwdLastSet"), Some(133_497_504_000_000_000));
        assert_eq!(bag().first_i64("sAMAccountName"), None);
        assert_eq!(bag().first_i64("missing"), None);
    }

    #[test]
    fn test_pairs_skips_empty_values() {
        let pairs = bag().pairs();
        assert!(pairs.iter().all(|p| p.name != "mail"));
        assert!(pairs.iter().any(|p| p.name == "sAMAccountName" && p.value == "alice"));
    }

    #[test]
    fn test_dn() {
        assert_eq!(bag().dn(), "CN=Alice,OU=Staff,DC=example,DC=com");
    }
}

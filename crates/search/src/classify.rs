//! Query classification
//!
//! Part codes in this catalog conventionally start with a digit, so a query
//! whose first character is a digit targets codes and anything else targets
//! descriptions. It is a heuristic: "CBL001" is searched as a description
//! unless the caller forces the kind.

use partlookup_common::PartRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which record field a query is matched against
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Code,
    Description,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Code => "code",
            QueryKind::Description => "description",
        }
    }

    /// The field of `record` this kind targets
    pub fn field<'r>(&self, record: &'r PartRecord) -> &'r str {
        match self {
            QueryKind::Code => &record.code,
            QueryKind::Description => &record.description,
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw query. `None` for empty or whitespace-only input.
pub fn classify(raw: &str) -> Option<QueryKind> {
    let first = raw.trim().chars().next()?;
    if first.is_ascii_digit() {
        Some(QueryKind::Code)
    } else {
        Some(QueryKind::Description)
    }
}

/// A trimmed, lowercased query together with its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedQuery {
    pub kind: QueryKind,
    needle: String,
}

impl ClassifiedQuery {
    /// Classify and normalize `raw`. `None` for empty input.
    pub fn parse(raw: &str) -> Option<Self> {
        let kind = classify(raw)?;
        Some(Self::with_kind(raw, kind))
    }

    /// Skip classification and match against `kind`
    pub fn with_kind(raw: &str, kind: QueryKind) -> Self {
        Self {
            kind,
            needle: raw.trim().to_lowercase(),
        }
    }

    /// Lowercased search text
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Case-insensitive substring containment on the classified field
    pub fn matches(&self, record: &PartRecord) -> bool {
        self.kind.field(record).to_lowercase().contains(&self.needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_prefix_is_code() {
        assert_eq!(classify("123"), Some(QueryKind::Code));
        assert_eq!(classify("  9-ABC"), Some(QueryKind::Code));
        assert_eq!(classify("0"), Some(QueryKind::Code));
    }

    #[test]
    fn test_other_prefix_is_description() {
        assert_eq!(classify("cable"), Some(QueryKind::Description));
        assert_eq!(classify("CBL001"), Some(QueryKind::Description));
        assert_eq!(classify(" -12"), Some(QueryKind::Description));
        assert_eq!(classify("ñandú"), Some(QueryKind::Description));
    }

    #[test]
    fn test_blank_is_unclassified() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   \t\n"), None);
        assert!(ClassifiedQuery::parse("  ").is_none());
    }

    #[test]
    fn test_substring_not_token_match() {
        let query = ClassifiedQuery::parse("OIL").unwrap();
        let record = PartRecord::structured("X1", "Foilwrap", "a.csv");
        assert!(query.matches(&record));
    }

    #[test]
    fn test_code_query_ignores_description() {
        let query = ClassifiedQuery::parse("12").unwrap();
        let record = PartRecord::structured("ABC", "Tornillo M12", "a.csv");
        assert!(!query.matches(&record));
        assert!(query.matches(&PartRecord::structured("4512", "Tornillo", "a.csv")));
    }

    #[test]
    fn test_kind_wire_format() {
        assert_eq!(serde_json::to_string(&QueryKind::Code).unwrap(), "\"code\"");
        let kind: QueryKind = serde_json::from_str("\"description\"").unwrap();
        assert_eq!(kind, QueryKind::Description);
    }

    #[test]
    fn test_forced_kind() {
        let query = ClassifiedQuery::with_kind(" Cbl ", QueryKind::Code);
        assert_eq!(query.needle(), "cbl");
        assert!(query.matches(&PartRecord::structured("CBL001", "Cable USB tipo A", "a.csv")));
    }
}

//! Lenient stock quantity.
//!
//! Stored stock values come from loosely-typed backends (JSON documents,
//! TEXT columns) and are occasionally junk. A malformed value must not abort
//! a whole-store scan, so decoding preserves the raw text and numeric access
//! is fallible instead.

use serde::{Deserialize, Serialize};

/// A stock quantity as it was stored.
///
/// `Number` is the well-formed case. `Raw` holds anything that did not decode
/// as a number; callers decide per-record whether to recover or skip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Raw(String),
}

impl Quantity {
    /// Parse a stored text value. Numeric text becomes `Number`, anything
    /// else is preserved as `Raw`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Raw(raw.to_string()),
        }
    }

    /// Numeric view. `Raw` values get one more parse attempt (variants stored
    /// numbers as strings); `None` means the record is corrupt.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Raw(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Some(n),
                _ => None,
            },
        }
    }

    pub fn is_corrupt(&self) -> bool {
        self.as_f64().is_none()
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl From<f64> for Quantity {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_number_decodes_as_number() {
        let q: Quantity = serde_json::from_str("8").unwrap();
        assert_eq!(q.as_f64(), Some(8.0));
    }

    #[test]
    fn numeric_string_is_recoverable() {
        let q: Quantity = serde_json::from_str("\" 12.5 \"").unwrap();
        assert!(matches!(q, Quantity::Raw(_)));
        assert_eq!(q.as_f64(), Some(12.5));
    }

    #[test]
    fn junk_string_is_corrupt() {
        let q: Quantity = serde_json::from_str("\"많이\"").unwrap();
        assert!(q.is_corrupt());
        assert_eq!(q.as_f64(), None);
    }

    #[test]
    fn parse_matches_decode_behavior() {
        assert_eq!(Quantity::parse("3"), Quantity::Number(3.0));
        assert_eq!(Quantity::parse("nope"), Quantity::Raw("nope".to_string()));
    }

    #[test]
    fn non_finite_numbers_are_corrupt() {
        assert!(Quantity::Number(f64::NAN).is_corrupt());
        assert!(Quantity::parse("inf").is_corrupt());
    }
}

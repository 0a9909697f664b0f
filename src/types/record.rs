//! Annotation records as loaded from a record source.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identifier of a record. Numeric ids are kept in their decimal form so
/// ids read back from a score table compare equal to the loaded ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// Id used when a record carries none: its position in the source.
    #[must_use]
    pub fn positional(index: usize) -> Self {
        Self(index.to_string())
    }

    /// Derive an id from a JSON value; `None` for null, empty, or structured values.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self::new(s.as_str())),
            Value::Number(n) => Some(Self(n.to_string())),
            Value::Bool(b) => Some(Self(b.to_string())),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// One annotation unit: a media reference, the prompt, and the answer to score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Raw video reference as found in the source (file name, path, or URL).
    pub video_ref: String,
    pub prompt: String,
    pub answer: String,
}

/// Flatten a loosely typed JSON value into display text.
///
/// Strings are kept verbatim, arrays of strings are joined line by line, and
/// any other structure falls back to compact JSON.
#[must_use]
pub fn normalize_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_and_string_ids_normalize() {
        assert_eq!(RecordId::from_json(&json!(17)).unwrap().as_str(), "17");
        assert_eq!(RecordId::from_json(&json!(" a-1 ")).unwrap().as_str(), "a-1");
        assert!(RecordId::from_json(&json!(null)).is_none());
        assert!(RecordId::from_json(&json!("  ")).is_none());
        assert!(RecordId::from_json(&json!({"x": 1})).is_none());
    }

    #[test]
    fn text_normalization() {
        assert_eq!(normalize_text(&json!("plain")), "plain");
        assert_eq!(normalize_text(&json!(null)), "");
        assert_eq!(normalize_text(&json!(["a", "b"])), "a\nb");
        assert_eq!(normalize_text(&json!({"k": 1})), r#"{"k":1}"#);
        assert_eq!(normalize_text(&json!(4.5)), "4.5");
    }
}

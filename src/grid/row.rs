//! Row records displayed by the grid.
//!
//! A row is an opaque JSON object. The grid only ever reads its `id` field;
//! everything else is interpreted through column descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The field every row must carry.
pub const ID_FIELD: &str = "id";

/// Identifier of a row.
///
/// Backends return either integer or string primary keys, so both are kept
/// verbatim and compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowId {
    /// Integer primary key.
    Int(i64),
    /// String primary key (UUIDs, slugs).
    Text(String),
}

impl RowId {
    /// Extract an id from a JSON value.
    ///
    /// Returns `None` for nulls, floats, objects and other shapes that
    /// cannot act as a key.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RowId::Int),
            Value::String(s) if !s.is_empty() => Some(RowId::Text(s.clone())),
            _ => None,
        }
    }

    /// Convert back into a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            RowId::Int(n) => Value::from(*n),
            RowId::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(n) => write!(f, "{}", n),
            RowId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowId {
    fn from(n: i64) -> Self {
        RowId::Int(n)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId::Text(s.to_string())
    }
}

/// A single record.
///
/// Rows are never mutated by the grid while they are displayed; edits go
/// into a separate copy held by the edit session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a row from a JSON value.
    ///
    /// Returns `None` if the value is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// The row identifier, if present and usable.
    pub fn id(&self) -> Option<RowId> {
        self.0.get(ID_FIELD).and_then(RowId::from_value)
    }

    /// Get a field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a field value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Check if the row has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Shallow-merge `overlay` into this row; overlay fields win.
    pub fn overlay(&mut self, overlay: &Row) {
        for (key, value) in overlay.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Return a copy of this row with `overlay` merged on top.
    pub fn merged(&self, overlay: &Row) -> Row {
        let mut out = self.clone();
        out.overlay(overlay);
        out
    }

    /// Keep only the fields whose key satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|key, _| keep(key));
    }

    /// Consume the row into its JSON map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Borrow the row as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Plain display text for a field: the raw value, or `-` when the value is
/// missing, null or an empty string.
pub fn display_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) if s.is_empty() => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => if *b { "Sim" } else { "Não" }.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Readable text used when a column renderer fails.
///
/// Objects and arrays are JSON-encoded; scalars are shown raw; null and
/// missing values become `-`.
pub fn fallback_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// The text a default input shows for a value.
pub fn input_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        Row::from_value(value).unwrap()
    }

    #[test]
    fn test_row_id_int_and_text() {
        assert_eq!(row(json!({"id": 7})).id(), Some(RowId::Int(7)));
        assert_eq!(
            row(json!({"id": "a1b2"})).id(),
            Some(RowId::Text("a1b2".to_string()))
        );
    }

    #[test]
    fn test_row_id_missing_or_unusable() {
        assert_eq!(row(json!({"nome": "x"})).id(), None);
        assert_eq!(row(json!({"id": null})).id(), None);
        assert_eq!(row(json!({"id": ""})).id(), None);
        assert_eq!(row(json!({"id": 1.5})).id(), None);
    }

    #[test]
    fn test_row_id_display() {
        assert_eq!(RowId::Int(42).to_string(), "42");
        assert_eq!(RowId::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Row::from_value(json!([1, 2])).is_none());
        assert!(Row::from_value(json!("text")).is_none());
    }

    #[test]
    fn test_merged_overlay_wins() {
        let base = row(json!({"id": 1, "nome": "A", "cod": "X"}));
        let overlay = row(json!({"nome": "B"}));
        let merged = base.merged(&overlay);
        assert_eq!(merged, row(json!({"id": 1, "nome": "B", "cod": "X"})));
        // The original is untouched
        assert_eq!(base.get("nome"), Some(&json!("A")));
    }

    #[test]
    fn test_display_text_placeholders() {
        assert_eq!(display_text(None), "-");
        assert_eq!(display_text(Some(&Value::Null)), "-");
        assert_eq!(display_text(Some(&json!(""))), "-");
        assert_eq!(display_text(Some(&json!("Bloco A"))), "Bloco A");
        assert_eq!(display_text(Some(&json!(12))), "12");
        assert_eq!(display_text(Some(&json!(true))), "Sim");
    }

    #[test]
    fn test_fallback_text_encodes_objects() {
        assert_eq!(
            fallback_text(Some(&json!({"nome": "Bloco"}))),
            r#"{"nome":"Bloco"}"#
        );
        assert_eq!(fallback_text(Some(&json!("raw"))), "raw");
        assert_eq!(fallback_text(None), "-");
    }

    #[test]
    fn test_input_text() {
        assert_eq!(input_text(None), "");
        assert_eq!(input_text(Some(&json!(3))), "3");
        assert_eq!(input_text(Some(&json!("abc"))), "abc");
    }
}

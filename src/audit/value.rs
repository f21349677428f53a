//! Snapshot values
//!
//! A [`Snapshot`] is a field-keyed view of one record at one instant. Field
//! values are a closed tagged union so redaction and diffing stay exhaustive.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuditorResult;

/// Free-form audit tags (actor tags, bulk descriptor)
pub type Tags = BTreeMap<String, FieldValue>;

/// A single field value inside a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Parse a command-line literal: `true`/`false`/`null`, integers,
    /// floats, JSON arrays/objects, anything else as text
    pub fn parse_literal(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "true" => return FieldValue::Bool(true),
            "false" => return FieldValue::Bool(false),
            "null" => return FieldValue::Null,
            _ => {}
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return FieldValue::Integer(n);
        }
        // NaN and infinities stay text; they have no JSON form
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return FieldValue::Float(f);
            }
        }
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
                return value.into();
            }
        }
        FieldValue::Text(raw.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            other => match serde_json::to_string(other) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => FieldValue::Text(s),
            serde_json::Value::Array(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::from).collect())
            }
            serde_json::Value::Object(map) => FieldValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        FieldValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl From<Snapshot> for FieldValue {
    fn from(snapshot: Snapshot) -> Self {
        FieldValue::Map(snapshot.0)
    }
}

/// Field-keyed state of a record at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, FieldValue>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a JSON value
    ///
    /// Anything other than a JSON object yields an empty snapshot.
    pub fn from_value(value: serde_json::Value) -> Self {
        match FieldValue::from(value) {
            FieldValue::Map(fields) => Self(fields),
            other => {
                tracing::debug!(value = %other, "non-object snapshot treated as empty");
                Self::default()
            }
        }
    }

    /// Capture a snapshot of any serializable record
    pub fn capture<T: Serialize + ?Sized>(record: &T) -> AuditorResult<Self> {
        Ok(Self::from_value(serde_json::to_value(record)?))
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut FieldValue> {
        self.0.get_mut(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every field of `condition` is present here with an equal value
    pub fn matches(&self, condition: &Snapshot) -> bool {
        condition
            .iter()
            .all(|(field, expected)| self.get(field) == Some(expected))
    }
}

impl FromIterator<(String, FieldValue)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Snapshot {
    type Item = (String, FieldValue);
    type IntoIter = btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::diff::diff;
    use serde_json::json;

    #[test]
    fn test_from_json_object() {
        let snapshot = Snapshot::from_value(json!({
            "name": "John Doe",
            "age": 42,
            "score": 1.5,
            "active": true,
            "phone": null,
            "roles": ["admin", "editor"],
            "address": {"city": "Oslo"}
        }));

        assert_eq!(snapshot.len(), 7);
        assert_eq!(snapshot.get("name"), Some(&FieldValue::Text("John Doe".into())));
        assert_eq!(snapshot.get("age"), Some(&FieldValue::Integer(42)));
        assert_eq!(snapshot.get("score"), Some(&FieldValue::Float(1.5)));
        assert_eq!(snapshot.get("active"), Some(&FieldValue::Bool(true)));
        assert_eq!(snapshot.get("phone"), Some(&FieldValue::Null));
        assert!(matches!(snapshot.get("roles"), Some(FieldValue::List(items)) if items.len() == 2));
        assert!(matches!(snapshot.get("address"), Some(FieldValue::Map(_))));
    }

    #[test]
    fn test_non_object_is_empty() {
        assert!(Snapshot::from_value(json!(null)).is_empty());
        assert!(Snapshot::from_value(json!([1, 2, 3])).is_empty());
        assert!(Snapshot::from_value(json!("text")).is_empty());
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let snapshot = Snapshot::new().with("name", "A").with("count", 3i64);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json, json!({"count": 3, "name": "A"}));

        let back: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_null_deserializes_to_null_variant() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert_eq!(snapshot.get("phone"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_matches_condition() {
        let record = Snapshot::new()
            .with("status", "pending")
            .with("phone", "555-1234");

        assert!(record.matches(&Snapshot::new().with("status", "pending")));
        assert!(record.matches(&Snapshot::new()));
        assert!(!record.matches(&Snapshot::new().with("status", "archived")));
        assert!(!record.matches(&Snapshot::new().with("missing", "x")));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(FieldValue::parse_literal("true"), FieldValue::Bool(true));
        assert_eq!(FieldValue::parse_literal("null"), FieldValue::Null);
        assert_eq!(FieldValue::parse_literal("42"), FieldValue::Integer(42));
        assert_eq!(FieldValue::parse_literal("2.5"), FieldValue::Float(2.5));
        assert_eq!(
            FieldValue::parse_literal("555-1234"),
            FieldValue::Text("555-1234".into())
        );
        assert!(matches!(
            FieldValue::parse_literal(r#"{"$in": ["a", "b"]}"#),
            FieldValue::Map(_)
        ));
    }

    #[test]
    fn test_parse_literal_keeps_non_finite_as_text() {
        for raw in ["NaN", "inf", "-infinity"] {
            let value = FieldValue::parse_literal(raw);
            assert_eq!(value, FieldValue::Text(raw.into()));

            let snapshot = Snapshot::new().with("x", value);
            assert!(diff(&snapshot, &snapshot.clone()).is_empty());
        }
    }

    #[test]
    fn test_capture_unsized() {
        let fields: &[u8] = &[1, 2];
        assert!(Snapshot::capture(fields).unwrap().is_empty());
        assert!(Snapshot::capture("text").unwrap().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Text("abc".into()).to_string(), "abc");
        assert_eq!(FieldValue::Integer(7).to_string(), "7");
        assert_eq!(
            FieldValue::List(vec![FieldValue::Integer(1), FieldValue::Integer(2)]).to_string(),
            "[1,2]"
        );
    }
}

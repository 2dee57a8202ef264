//! Closed value variant for model fields
//!
//! Every field of a model instance is exactly one of:
//! - a scalar (`Null`, `Integer`, `Real`, `Text`, `Bool`, `Bytes`)
//! - a container (`List`, `Set`, `Map`) of further values
//! - a nested model (`Model`), exclusively owned by its container

use crate::model::record::{Model, Record};
use std::collections::BTreeMap;

/// A field or container element value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
    Bytes(Vec<u8>),
    /// Ordered sequence
    List(Vec<Value>),
    /// Unordered collection; element order is preserved but not meaningful
    Set(Vec<Value>),
    /// Nested mapping with string keys
    Map(BTreeMap<String, Value>),
    /// Nested model instance, persisted as its own row
    Model(Record),
}

impl Value {
    /// Wrap a nested model instance
    pub fn model(model: &dyn Model) -> Self {
        Value::Model(model.to_record())
    }

    /// Build a list from anything convertible into values
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a list of nested models
    pub fn models<'a, M, I>(items: I) -> Self
    where
        M: Model + 'a,
        I: IntoIterator<Item = &'a M>,
    {
        Value::List(items.into_iter().map(|m| Value::model(m)).collect())
    }

    /// Short runtime type name, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Bool(_) => "bool",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Model(_) => "model",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_scalar(&self) -> bool {
        !self.is_container() && !matches!(self, Value::Model(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Value::List(_) | Value::Set(_) | Value::Map(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render as JSON for display and export
    ///
    /// Bytes render as arrays of numbers; sets render as arrays; nested
    /// models render as objects including their `id`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Integer(i) => Json::from(*i),
            Value::Real(r) => serde_json::Number::from_f64(*r)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Text(s) => Json::String(s.clone()),
            Value::Bool(b) => Json::Bool(*b),
            Value::Bytes(b) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
            Value::List(items) | Value::Set(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Model(record) => record.to_json(),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Model(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(Value::Integer(1).is_scalar());
        assert!(Value::Null.is_scalar());
        assert!(Value::Bytes(vec![1]).is_scalar());
        assert!(Value::List(vec![]).is_container());
        assert!(Value::Map(BTreeMap::new()).is_container());

        let nested = Value::Model(Record::new("senders"));
        assert!(!nested.is_scalar());
        assert!(!nested.is_container());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    }

    #[test]
    fn test_to_json_nested() {
        let mut map = BTreeMap::new();
        map.insert("tags".to_string(), Value::list(["a", "b"]));
        map.insert("score".to_string(), Value::Real(1.5));

        let json = Value::Map(map).to_json();
        assert_eq!(json["tags"][1], "b");
        assert_eq!(json["score"], 1.5);
    }

    #[test]
    fn test_non_finite_real_renders_null() {
        assert_eq!(Value::Real(f64::NAN).to_json(), serde_json::Value::Null);
    }
}

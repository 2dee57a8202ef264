//! Decoded row mappings and typed field extraction
//!
//! Decoding produces a [`Fields`] mapping of logical field name to value.
//! Model types pull their fields back out with [`Fields::take`] and
//! friends; conversions are lenient where SQLite's storage classes lose
//! information (booleans come back as integers, integral reals as integers).

use crate::errors::{Result, RowGraphError};
use crate::model::record::FromFields;
use crate::model::value::Value;
use std::collections::BTreeMap;

/// Logical field name → decoded value, including `id`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }

    /// Row identity, if the mapping came from a stored row
    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    /// Remove and convert a field; missing fields are an error
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T> {
        match self.0.remove(name) {
            Some(value) => T::from_value(value).map_err(|e| with_field(e, name)),
            None => Err(RowGraphError::FieldConversion {
                field: name.to_string(),
                expected: std::any::type_name::<T>().to_string(),
                found: "missing".to_string(),
            }),
        }
    }

    /// Remove and convert a field, falling back to the type's default
    ///
    /// Missing and null fields both yield the default. Columns whose blob
    /// was never written decode as missing.
    pub fn take_or_default<T: FromValue + Default>(&mut self, name: &str) -> Result<T> {
        match self.0.remove(name) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => T::from_value(value).map_err(|e| with_field(e, name)),
        }
    }

    /// Remove a nested model field
    ///
    /// Returns `None` when the field is missing or null.
    pub fn take_model<M: FromFields>(&mut self, name: &str) -> Result<Option<M>> {
        match self.0.remove(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => model_from_value(value)
                .map(Some)
                .map_err(|e| with_field(e, name)),
        }
    }

    /// Remove a container field holding nested models
    pub fn take_models<M: FromFields>(&mut self, name: &str) -> Result<Vec<M>> {
        match self.0.remove(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::List(items)) | Some(Value::Set(items)) => items
                .into_iter()
                .map(model_from_value)
                .collect::<Result<Vec<_>>>()
                .map_err(|e| with_field(e, name)),
            Some(other) => Err(conversion(name, "list of models", &other)),
        }
    }
}

impl From<BTreeMap<String, Value>> for Fields {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn model_from_value<M: FromFields>(value: Value) -> Result<M> {
    match value {
        Value::Map(map) => M::from_fields(Fields(map)),
        Value::Model(record) => {
            let mut fields = Fields(record.fields);
            if let Some(id) = record.id {
                fields.insert("id", Value::Integer(id));
            }
            M::from_fields(fields)
        }
        other => Err(conversion("", "model", &other)),
    }
}

fn conversion(field: &str, expected: &str, found: &Value) -> RowGraphError {
    RowGraphError::FieldConversion {
        field: field.to_string(),
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}

// Fill in the field name on conversion errors raised below the field level
fn with_field(err: RowGraphError, name: &str) -> RowGraphError {
    match err {
        RowGraphError::FieldConversion {
            field,
            expected,
            found,
        } if field.is_empty() => RowGraphError::FieldConversion {
            field: name.to_string(),
            expected,
            found,
        },
        other => other,
    }
}

/// Conversion from a decoded value into a Rust field type
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Ok(i),
            Value::Bool(b) => Ok(i64::from(b)),
            other => Err(conversion("", "integer", &other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| RowGraphError::FieldConversion {
            field: String::new(),
            expected: "i32".to_string(),
            found: wide.to_string(),
        })
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Real(r) => Ok(r),
            Value::Integer(i) => Ok(i as f64),
            other => Err(conversion("", "real", &other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Integer(i) => Ok(i != 0),
            other => Err(conversion("", "bool", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(conversion("", "text", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(conversion("", "bytes", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

macro_rules! impl_from_value_for_sequence {
    ($($elem:ty),* $(,)?) => {
        $(
            impl FromValue for Vec<$elem> {
                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::List(items) | Value::Set(items) => {
                            items.into_iter().map(<$elem>::from_value).collect()
                        }
                        other => Err(conversion("", "list", &other)),
                    }
                }
            }
        )*
    };
}

// Sequences of scalars; nested models go through `Fields::take_models`.
// `Vec<u8>` is bytes, not a sequence.
impl_from_value_for_sequence!(
    Value,
    i64,
    i32,
    f64,
    bool,
    String,
    Vec<u8>,
    Option<i64>,
    Option<String>,
);

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            other => Err(conversion("", "map", &other)),
        }
    }
}

//! Template field descriptors and column derivation
//!
//! A template is the shape of a model type: its table plus one descriptor
//! per field. Descriptors are resolved once from a default-constructed
//! instance, never re-derived per value. The same descriptors can be
//! recovered from a migrated table's columns, since the column prefix
//! records the field kind.

use crate::model::record::{Model, Record};
use crate::model::value::Value;
use rowgraph_core_types::layout::{is_id_column, BLOB_PREFIX, FOREIGN_KEY_PREFIX};

/// SQL storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
    Null,
}

impl ColumnType {
    /// Storage type chosen by a value's runtime type
    pub fn for_value(value: &Value) -> Self {
        match value {
            Value::Integer(_) | Value::Bool(_) => ColumnType::Integer,
            Value::Real(_) => ColumnType::Real,
            Value::Text(_) => ColumnType::Text,
            Value::Bytes(_) => ColumnType::Blob,
            Value::Null => ColumnType::Null,
            Value::List(_) | Value::Set(_) | Value::Map(_) => ColumnType::Blob,
            // Reference columns are integer-flavoured; the token is stored as text
            Value::Model(_) => ColumnType::Integer,
        }
    }

    /// Parse a declared type as reported by `PRAGMA table_info`
    pub fn from_declared(declared: &str) -> Self {
        match declared.trim().to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" | "BOOLEAN" => ColumnType::Integer,
            "REAL" | "FLOAT" | "DOUBLE" => ColumnType::Real,
            "TEXT" | "VARCHAR" => ColumnType::Text,
            "BLOB" => ColumnType::Blob,
            _ => ColumnType::Null,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Null => "NULL",
        }
    }

    /// Type token for DDL; null-typed columns are declared without one
    pub fn ddl_type(self) -> Option<&'static str> {
        match self {
            ColumnType::Null => None,
            other => Some(other.sql()),
        }
    }

    /// Literal default used when a column is added to existing rows
    pub fn default_literal(self) -> &'static str {
        match self {
            ColumnType::Text => "''",
            ColumnType::Integer => "0",
            ColumnType::Real => "0.0",
            ColumnType::Blob | ColumnType::Null => "NULL",
        }
    }
}

/// How a field's value is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Stored as-is in an unprefixed column
    Scalar(ColumnType),
    /// Whole container serialized into one blob column
    Container,
    /// Nested model saved as its own row, referenced by token
    ModelRef,
}

impl FieldKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::List(_) | Value::Set(_) | Value::Map(_) => FieldKind::Container,
            Value::Model(_) => FieldKind::ModelRef,
            scalar => FieldKind::Scalar(ColumnType::for_value(scalar)),
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            FieldKind::Scalar(_) => "",
            FieldKind::Container => BLOB_PREFIX,
            FieldKind::ModelRef => FOREIGN_KEY_PREFIX,
        }
    }

    pub fn column_type(self) -> ColumnType {
        match self {
            FieldKind::Scalar(t) => t,
            FieldKind::Container => ColumnType::Blob,
            FieldKind::ModelRef => ColumnType::Integer,
        }
    }

    /// Whether a runtime value can be stored in a field of this kind
    ///
    /// Scalar columns take any scalar (SQLite typing is per value); null
    /// stands in for an absent container or nested model.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::Scalar(_) => value.is_scalar(),
            FieldKind::Container => value.is_container() || value.is_null(),
            FieldKind::ModelRef => matches!(value, Value::Model(_) | Value::Null),
        }
    }

    /// Split a stored column name into its logical field name and kind
    pub fn from_column(column: &str, declared: &str) -> (String, FieldKind) {
        if let Some(field) = column.strip_prefix(FOREIGN_KEY_PREFIX) {
            (field.to_string(), FieldKind::ModelRef)
        } else if let Some(field) = column.strip_prefix(BLOB_PREFIX) {
            (field.to_string(), FieldKind::Container)
        } else {
            (
                column.to_string(),
                FieldKind::Scalar(ColumnType::from_declared(declared)),
            )
        }
    }
}

/// One field of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Stored column name, prefix included
    pub fn column_name(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.name)
    }
}

/// A desired column of a template's table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
}

/// Shape of a model type: table plus field descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub table: String,
    pub fields: Vec<FieldDescriptor>,
}

impl Template {
    /// Resolve the template of a model from a (default) instance
    pub fn of(model: &dyn Model) -> Self {
        Self::from_record(&model.to_record())
    }

    pub fn from_record(record: &Record) -> Self {
        let fields = record
            .fields
            .iter()
            .filter(|(name, _)| !is_id_column(name))
            .map(|(name, value)| FieldDescriptor {
                name: name.clone(),
                kind: FieldKind::of(value),
            })
            .collect();
        Self {
            table: record.table.clone(),
            fields,
        }
    }

    /// Recover descriptors from a migrated table's `(column, declared type)` pairs
    pub fn from_columns<I, S>(table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let fields = columns
            .into_iter()
            .filter(|(name, _)| !is_id_column(name.as_ref()))
            .map(|(name, declared)| {
                let (name, kind) = FieldKind::from_column(name.as_ref(), declared.as_ref());
                FieldDescriptor { name, kind }
            })
            .collect();
        Self {
            table: table.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn columns(&self) -> Vec<ColumnSpec> {
        derive_columns(self)
    }
}

/// Desired column set of a template's table, identity column excluded
///
/// Pure: depends only on the template, never on a live store.
pub fn derive_columns(template: &Template) -> Vec<ColumnSpec> {
    template
        .fields
        .iter()
        .map(|field| ColumnSpec {
            name: field.column_name(),
            column_type: field.kind.column_type(),
        })
        .collect()
}

//! Encode direction: model instances to rows
//!
//! Saving cascades bottom-up. Nested models are written first, each as its
//! own row, and the owner stores their reference tokens. Containers are
//! flattened element by element into one blob column. The owner's row is
//! written last.

use crate::codec::blob::{Blob, Element};
use crate::db::quote_ident;
use crate::errors::{from_rusqlite, unsupported_type, Result};
use crate::migrator::live_template;
use rowgraph_core::errors::{ExError, ExErrorKind, RowGraphError};
use rowgraph_core::model::{FieldKind, Record, RefToken, Value};
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;

/// Result of encoding one value
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    /// Scalar, passed through
    Scalar(Value),
    /// Nested model, written as its own row
    Token(RefToken),
    /// Container, serialized
    Blob(Vec<u8>),
}

/// Write a model instance and everything it owns; returns its row token
///
/// A record with an id replaces that row; one without gets a new row.
/// Nested models never carry their identity into the write, so each
/// cascade inserts fresh nested rows.
pub fn encode_record(conn: &Connection, record: &Record) -> Result<RefToken> {
    let table = record.table.as_str();
    if table.is_empty() {
        return Err(unsupported_value("nested model declares no table"));
    }
    let template = live_template(conn, table).map_err(|e| match e.kind() {
        ExErrorKind::Schema => RowGraphError::UnknownTable {
            table: table.to_string(),
        }
        .into(),
        _ => e,
    })?;

    let mut columns: Vec<(String, SqlValue)> = Vec::with_capacity(record.fields.len());
    for (name, value) in &record.fields {
        let descriptor = template.field(name).ok_or_else(|| {
            unsupported_type(table, name, "field is not part of the migrated template")
        })?;
        if !descriptor.kind.accepts(value) {
            return Err(unsupported_type(
                table,
                name,
                format!(
                    "{} value in a field migrated as {}",
                    value.kind_name(),
                    kind_label(descriptor.kind)
                ),
            ));
        }

        let stored = match encode_value(conn, value).map_err(|e| locate(e, table, name))? {
            Encoded::Scalar(scalar) => to_sql(&scalar),
            Encoded::Token(token) => SqlValue::Text(token.to_string()),
            Encoded::Blob(bytes) => SqlValue::Blob(bytes),
        };
        columns.push((descriptor.column_name(), stored));
    }

    let row_id = write_row(conn, table, record.id, columns)?;
    tracing::debug!(table, row_id, "wrote row");
    Ok(RefToken::new(row_id, table))
}

/// Encode one field or element value
///
/// Models are written (cascading) and become tokens; containers become
/// blobs; scalars pass through.
pub fn encode_value(conn: &Connection, value: &Value) -> Result<Encoded> {
    match value {
        Value::Model(record) => encode_nested(conn, record).map(Encoded::Token),
        Value::List(items) => encode_elements(conn, items)
            .and_then(|items| Blob::List(items).to_bytes())
            .map(Encoded::Blob),
        Value::Set(items) => encode_elements(conn, items)
            .and_then(|items| Blob::Set(items).to_bytes())
            .map(Encoded::Blob),
        Value::Map(map) => {
            let mut items = std::collections::BTreeMap::new();
            for (key, item) in map {
                items.insert(key.clone(), encode_element(conn, item)?);
            }
            Blob::Map(items).to_bytes().map(Encoded::Blob)
        }
        Value::Real(r) if !r.is_finite() => {
            Err(unsupported_value(format!("non-finite real {}", r)))
        }
        scalar => Ok(Encoded::Scalar(scalar.clone())),
    }
}

fn encode_nested(conn: &Connection, record: &Record) -> Result<RefToken> {
    let fresh = Record {
        id: None,
        ..record.clone()
    };
    encode_record(conn, &fresh)
}

fn encode_elements(conn: &Connection, items: &[Value]) -> Result<Vec<Element>> {
    items.iter().map(|item| encode_element(conn, item)).collect()
}

fn encode_element(conn: &Connection, item: &Value) -> Result<Element> {
    Ok(match encode_value(conn, item)? {
        Encoded::Token(token) => Element::Ref(token.to_string()),
        Encoded::Blob(bytes) => Element::Blob(bytes),
        Encoded::Scalar(scalar) => match scalar {
            Value::Null => Element::Null,
            Value::Integer(i) => Element::Integer(i),
            Value::Real(r) => Element::Real(r),
            Value::Text(s) => Element::Text(s),
            Value::Bool(b) => Element::Bool(b),
            Value::Bytes(b) => Element::Bytes(b),
            other => {
                return Err(unsupported_value(format!(
                    "{} is not a scalar",
                    other.kind_name()
                )))
            }
        },
    })
}

fn write_row(
    conn: &Connection,
    table: &str,
    id: Option<i64>,
    mut columns: Vec<(String, SqlValue)>,
) -> Result<i64> {
    if let Some(id) = id {
        columns.insert(0, ("id".to_string(), SqlValue::Integer(id)));
    }

    if columns.is_empty() {
        conn.execute(
            &format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table)),
            [],
        )
        .map_err(from_rusqlite)?;
        return Ok(conn.last_insert_rowid());
    }

    let names = columns
        .iter()
        .map(|(name, _)| quote_ident(name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
        quote_ident(table),
        names,
        placeholders
    );
    conn.execute(
        &sql,
        rusqlite::params_from_iter(columns.iter().map(|(_, value)| value)),
    )
    .map_err(from_rusqlite)?;

    Ok(id.unwrap_or_else(|| conn.last_insert_rowid()))
}

/// Scalar value to its SQLite storage form
fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Real(r) => SqlValue::Real(*r),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Bytes(b) => SqlValue::Blob(b.clone()),
        _ => SqlValue::Null,
    }
}

fn kind_label(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Scalar(_) => "scalar",
        FieldKind::Container => "container",
        FieldKind::ModelRef => "nested model",
    }
}

// Raised below the field level; `locate` attaches table and field on the way up
fn unsupported_value(reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::UnsupportedType).with_message(reason)
}

fn locate(err: ExError, table: &str, field: &str) -> ExError {
    if err.kind() == ExErrorKind::UnsupportedType && err.table().is_none() {
        unsupported_type(table, field, err.message())
    } else {
        err
    }
}

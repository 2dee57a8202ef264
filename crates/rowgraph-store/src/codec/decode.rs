//! Decode direction: rows back to field mappings
//!
//! Reference columns are resolved by fetching the referenced row and
//! decoding it in turn, so a whole graph is rebuilt from one row. Blob
//! columns are deserialized and their elements resolved the same way.
//!
//! Blob handling is lenient: bytes that do not parse are kept as raw
//! bytes, and a container element whose reference dangles is kept as its
//! raw token text. Both are logged at `warn`. A dangling reference column
//! is not lenient; it fails the read with `ERR_MISSING_REFERENCE`.

use crate::codec::blob::{Blob, Element};
use crate::db::quote_ident;
use crate::errors::{from_rusqlite, Result};
use crate::migrator::table_exists;
use rowgraph_core::errors::{ExErrorKind, RowGraphError};
use rowgraph_core::model::{Fields, RefToken, Value};
use rowgraph_core_types::layout::{BLOB_PREFIX, FOREIGN_KEY_PREFIX};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, Params};
use std::collections::BTreeMap;

/// One stored row: column name and raw value, in column order
pub type RawRow = Vec<(String, SqlValue)>;

/// Run a query and collect every row with its column names
pub fn query_rows<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<RawRow>> {
    let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
    let names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let rows = stmt
        .query_map(params, |row| {
            names
                .iter()
                .enumerate()
                .map(|(i, name)| Ok((name.clone(), row.get::<_, SqlValue>(i)?)))
                .collect::<rusqlite::Result<RawRow>>()
        })
        .map_err(from_rusqlite)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}

/// Decode one stored row into logical fields, `id` included
pub fn decode_row(conn: &Connection, row: RawRow) -> Result<Fields> {
    let mut fields = Fields::new();
    for (column, stored) in row {
        if let Some(name) = column.strip_prefix(BLOB_PREFIX) {
            // A blob column that was never written holds NULL; leave the field out
            if let SqlValue::Blob(bytes) = stored {
                fields.insert(name, decode_blob(conn, &bytes)?);
            }
        } else if let Some(name) = column.strip_prefix(FOREIGN_KEY_PREFIX) {
            let value = match stored {
                SqlValue::Text(text) => decode_reference(conn, &text)?,
                // NULL, or the integer default of a column added by migration
                _ => Value::Null,
            };
            fields.insert(name, value);
        } else {
            fields.insert(column, from_sql(stored));
        }
    }
    Ok(fields)
}

/// Fetch and decode the row a token points at
///
/// A missing table and a missing row are both dangling references.
pub fn fetch_reference(conn: &Connection, token: &RefToken) -> Result<Fields> {
    if !table_exists(conn, &token.table)? {
        return Err(missing_reference(token));
    }
    let sql = format!("SELECT * FROM {} WHERE id = ?1", quote_ident(&token.table));
    let row = query_rows(conn, &sql, [token.row_id])?.into_iter().next();
    match row {
        Some(row) => decode_row(conn, row),
        None => Err(missing_reference(token)),
    }
}

/// Check whether a token's row exists, without decoding it
pub fn reference_exists(conn: &Connection, token: &RefToken) -> Result<bool> {
    if !table_exists(conn, &token.table)? {
        return Ok(false);
    }
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT 1 FROM {} WHERE id = ?1", quote_ident(&token.table)),
            [token.row_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;
    Ok(found.is_some())
}

fn decode_reference(conn: &Connection, text: &str) -> Result<Value> {
    match RefToken::parse(text) {
        Ok(token) => fetch_reference(conn, &token).map(|fields| Value::Map(fields.into_inner())),
        Err(_) => {
            tracing::warn!(token = text, "malformed reference token, keeping text");
            Ok(Value::Text(text.to_string()))
        }
    }
}

fn decode_blob(conn: &Connection, bytes: &[u8]) -> Result<Value> {
    let blob = match Blob::from_bytes(bytes) {
        Ok(blob) => blob,
        Err(e) => {
            tracing::warn!(len = bytes.len(), error = %e, "undecodable blob, keeping raw bytes");
            return Ok(Value::Bytes(bytes.to_vec()));
        }
    };

    Ok(match blob {
        Blob::List(items) => Value::List(decode_elements(conn, items)?),
        Blob::Set(items) => Value::Set(decode_elements(conn, items)?),
        Blob::Map(items) => {
            let mut map = BTreeMap::new();
            for (key, item) in items {
                map.insert(key, decode_element(conn, item)?);
            }
            Value::Map(map)
        }
    })
}

fn decode_elements(conn: &Connection, items: Vec<Element>) -> Result<Vec<Value>> {
    items
        .into_iter()
        .map(|item| decode_element(conn, item))
        .collect()
}

fn decode_element(conn: &Connection, item: Element) -> Result<Value> {
    Ok(match item {
        Element::Null => Value::Null,
        Element::Integer(i) => Value::Integer(i),
        Element::Real(r) => Value::Real(r),
        Element::Text(s) => Value::Text(s),
        Element::Bool(b) => Value::Bool(b),
        Element::Bytes(b) => Value::Bytes(b),
        Element::Ref(text) => match decode_reference(conn, &text) {
            Err(e) if e.kind() == ExErrorKind::MissingReference => {
                tracing::warn!(token = %text, "dangling reference in container, keeping token");
                Value::Text(text)
            }
            decoded => decoded?,
        },
        Element::Blob(bytes) => match decode_blob(conn, &bytes) {
            Err(e) if e.kind() == ExErrorKind::MissingReference => {
                tracing::warn!(
                    len = bytes.len(),
                    error = %e,
                    "nested blob unresolved, keeping raw bytes"
                );
                Value::Bytes(bytes)
            }
            decoded => decoded?,
        },
    })
}

/// Raw SQLite value to a field value
fn from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::Integer(i),
        SqlValue::Real(r) => Value::Real(r),
        SqlValue::Text(s) => Value::Text(s),
        SqlValue::Blob(b) => Value::Bytes(b),
    }
}

fn missing_reference(token: &RefToken) -> rowgraph_core::ExError {
    RowGraphError::MissingReference {
        token: token.to_string(),
        table: token.table.clone(),
        row_id: token.row_id,
    }
    .into()
}

//! Reference integrity diagnostic
//!
//! Nothing keeps reference tokens valid: deleting a row leaves every token
//! pointing at it in place. This scan finds such tokens ahead of time, in
//! reference columns and inside container blobs, without decoding any
//! rows. It is read-only.

use crate::codec::blob::{Blob, Element};
use crate::codec::{query_rows, reference_exists};
use crate::db::quote_ident;
use crate::errors::{unknown_table, Result};
use crate::migrator::{table_columns, table_exists};
use rowgraph_core::model::RefToken;
use rowgraph_core_types::layout::{BLOB_PREFIX, FOREIGN_KEY_PREFIX};
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;

/// A stored token whose target row does not exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Table holding the token
    pub table: String,
    /// Row holding the token
    pub row_id: i64,
    /// Stored column name, prefix included
    pub column: String,
    pub token: String,
}

/// Scan the given tables for dangling reference tokens
pub fn check_references(conn: &Connection, tables: &[&str]) -> Result<Vec<DanglingReference>> {
    let mut dangling = Vec::new();
    for table in tables {
        if !table_exists(conn, table)? {
            return Err(unknown_table(table));
        }
        let columns: Vec<String> = table_columns(conn, table)?
            .into_iter()
            .map(|c| c.name)
            .filter(|name| name.starts_with(FOREIGN_KEY_PREFIX) || name.starts_with(BLOB_PREFIX))
            .collect();
        if columns.is_empty() {
            continue;
        }

        let select = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT id, {} FROM {}", select, quote_ident(table));
        for row in query_rows(conn, &sql, [])? {
            let mut cells = row.into_iter();
            let row_id = match cells.next() {
                Some((_, SqlValue::Integer(id))) => id,
                _ => continue,
            };
            for (column, stored) in cells {
                let mut tokens = Vec::new();
                match stored {
                    SqlValue::Text(text) if column.starts_with(FOREIGN_KEY_PREFIX) => {
                        tokens.push(text)
                    }
                    SqlValue::Blob(bytes) if column.starts_with(BLOB_PREFIX) => {
                        collect_blob_tokens(&bytes, &mut tokens)
                    }
                    _ => {}
                }
                for token in tokens {
                    // Malformed text is not a reference; decoding keeps it as text
                    let Ok(parsed) = RefToken::parse(&token) else {
                        continue;
                    };
                    if !reference_exists(conn, &parsed)? {
                        dangling.push(DanglingReference {
                            table: table.to_string(),
                            row_id,
                            column: column.clone(),
                            token,
                        });
                    }
                }
            }
        }
    }

    tracing::debug!(tables = tables.len(), found = dangling.len(), "checked references");
    Ok(dangling)
}

fn collect_blob_tokens(bytes: &[u8], out: &mut Vec<String>) {
    let Ok(blob) = Blob::from_bytes(bytes) else {
        return;
    };
    for element in blob.elements() {
        match element {
            Element::Ref(text) => out.push(text.clone()),
            Element::Blob(nested) => collect_blob_tokens(nested, out),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_record;
    use crate::migrator::auto_migrate;
    use rowgraph_core::model::{Record, Template, Value};
    use rowgraph_core::ExErrorKind;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        let sender = Record::new("senders").field("nickname", "");
        let event = Record::new("events")
            .field("sender", sender.clone())
            .field("crowd", Value::List(vec![]));
        auto_migrate(&conn, &Template::from_record(&sender)).unwrap();
        auto_migrate(&conn, &Template::from_record(&event)).unwrap();
        conn
    }

    #[test]
    fn test_clean_store_has_no_dangling_references() {
        let conn = setup();
        let event = Record::new("events")
            .field("sender", Record::new("senders"))
            .field("crowd", Value::List(vec![Value::Model(Record::new("senders"))]));
        encode_record(&conn, &event).unwrap();
        assert!(check_references(&conn, &["events", "senders"])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_finds_tokens_in_columns_and_blobs() {
        let conn = setup();
        let event = Record::new("events")
            .field("sender", Record::new("senders"))
            .field(
                "crowd",
                Value::List(vec![Value::List(vec![Value::Model(Record::new("senders"))])]),
            );
        encode_record(&conn, &event).unwrap();
        conn.execute("DELETE FROM senders", []).unwrap();

        let found = check_references(&conn, &["events"]).unwrap();
        let mut columns: Vec<_> = found.iter().map(|d| d.column.as_str()).collect();
        columns.sort_unstable();
        assert_eq!(columns, vec!["FOREIGN_KEY_sender", "PICKLE_BYTES_crowd"]);
        assert!(found.iter().all(|d| d.row_id == 1));
    }

    #[test]
    fn test_unknown_table() {
        let conn = setup();
        let err = check_references(&conn, &["nope"]).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::UnknownTable);
    }
}

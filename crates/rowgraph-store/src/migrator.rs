//! Template-driven schema migration
//!
//! `auto_migrate` makes a table's column set equal to its template's
//! current fields:
//! - creates the table with only the identity column when absent
//! - adds desired columns that are missing, with a type default
//! - drops existing columns the template no longer has (data is lost)
//!
//! No schema is cached; every call reads the live table. Applying the same
//! template twice is a no-op the second time.

use crate::db::quote_ident;
use crate::errors::{from_rusqlite, missing_table_name, Result};
use rowgraph_core::errors::RowGraphError;
use rowgraph_core::model::{derive_columns, ColumnSpec, Template};
use rowgraph_core_types::layout::is_id_column;
use rusqlite::{Connection, OptionalExtension};

/// A column of a live table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingColumn {
    pub name: String,
    pub declared_type: String,
}

/// What one migration changed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MigrationReport {
    pub table: String,
    pub created: bool,
    pub added: Vec<String>,
    pub dropped: Vec<String>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        !self.created && self.added.is_empty() && self.dropped.is_empty()
    }
}

/// Migrate the table backing `template` to its current shape
///
/// Runs in one transaction, committed before returning.
pub fn auto_migrate(conn: &Connection, template: &Template) -> Result<MigrationReport> {
    if template.table.is_empty() {
        return Err(missing_table_name("<anonymous template>"));
    }
    let table = template.table.as_str();
    let tx = conn.unchecked_transaction().map_err(from_rusqlite)?;

    let created = !table_exists(&tx, table)?;
    if created {
        tx.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY AUTOINCREMENT)",
                quote_ident(table)
            ),
            [],
        )
        .map_err(from_rusqlite)?;
    }

    let desired = derive_columns(template);
    let existing = table_columns(&tx, table)?;

    let mut report = MigrationReport {
        table: table.to_string(),
        created,
        ..MigrationReport::default()
    };

    for column in &desired {
        if is_id_column(&column.name) || existing.iter().any(|e| e.name == column.name) {
            continue;
        }
        tx.execute(&add_column_sql(table, column), [])
            .map_err(from_rusqlite)?;
        report.added.push(column.name.clone());
    }

    for column in &existing {
        if is_id_column(&column.name) || desired.iter().any(|d| d.name == column.name) {
            continue;
        }
        tx.execute(
            &format!(
                "ALTER TABLE {} DROP COLUMN {}",
                quote_ident(table),
                quote_ident(&column.name)
            ),
            [],
        )
        .map_err(from_rusqlite)?;
        report.dropped.push(column.name.clone());
    }

    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(
        table,
        created = report.created,
        added = report.added.len(),
        dropped = report.dropped.len(),
        "migrated table"
    );

    Ok(report)
}

fn add_column_sql(table: &str, column: &ColumnSpec) -> String {
    let ty = column.column_type;
    match ty.ddl_type() {
        Some(ddl) => format!(
            "ALTER TABLE {} ADD COLUMN {} {} DEFAULT {}",
            quote_ident(table),
            quote_ident(&column.name),
            ddl,
            ty.default_literal()
        ),
        None => format!(
            "ALTER TABLE {} ADD COLUMN {} DEFAULT {}",
            quote_ident(table),
            quote_ident(&column.name),
            ty.default_literal()
        ),
    }
}

/// Check whether a table exists
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;
    Ok(found.is_some())
}

/// List the columns of a live table in declaration order
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ExistingColumn>> {
    let mut stmt = conn
        .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
        .map_err(from_rusqlite)?;
    let columns = stmt
        .query_map([table], |row| {
            Ok(ExistingColumn {
                name: row.get(0)?,
                declared_type: row.get(1)?,
            })
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(columns)
}

/// List user tables
pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )
        .map_err(from_rusqlite)?;
    let tables = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(tables)
}

/// Recover the migrated template of a live table
///
/// Fails with a schema error when the table does not exist.
pub fn live_template(conn: &Connection, table: &str) -> Result<Template> {
    if !table_exists(conn, table)? {
        return Err(RowGraphError::TableNotFound {
            table: table.to_string(),
        }
        .into());
    }
    let columns = table_columns(conn, table)?;
    Ok(Template::from_columns(
        table,
        columns.into_iter().map(|c| (c.name, c.declared_type)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowgraph_core::model::{ColumnType, FieldDescriptor, FieldKind};
    use rowgraph_core::ExErrorKind;

    fn template(table: &str, fields: &[(&str, FieldKind)]) -> Template {
        Template {
            table: table.to_string(),
            fields: fields
                .iter()
                .map(|(name, kind)| FieldDescriptor {
                    name: name.to_string(),
                    kind: *kind,
                })
                .collect(),
        }
    }

    fn column_names(conn: &Connection, table: &str) -> Vec<String> {
        table_columns(conn, table)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    #[test]
    fn test_creates_table_with_columns() {
        let conn = Connection::open_in_memory().unwrap();
        let t = template(
            "senders",
            &[
                ("nickname", FieldKind::Scalar(ColumnType::Text)),
                ("age", FieldKind::Scalar(ColumnType::Integer)),
            ],
        );

        let report = auto_migrate(&conn, &t).unwrap();
        assert!(report.created);
        assert_eq!(report.added.len(), 2);
        assert_eq!(column_names(&conn, "senders"), vec!["id", "nickname", "age"]);
    }

    #[test]
    fn test_empty_table_name_is_schema_error() {
        let conn = Connection::open_in_memory().unwrap();
        let err = auto_migrate(&conn, &template("", &[])).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Schema);
    }

    #[test]
    fn test_null_typed_column_has_no_declared_type() {
        let conn = Connection::open_in_memory().unwrap();
        auto_migrate(
            &conn,
            &template("events", &[("reply_to", FieldKind::Scalar(ColumnType::Null))]),
        )
        .unwrap();

        let columns = table_columns(&conn, "events").unwrap();
        let reply_to = columns.iter().find(|c| c.name == "reply_to").unwrap();
        assert_eq!(reply_to.declared_type, "");
    }

    #[test]
    fn test_live_template_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        let err = live_template(&conn, "nope").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Schema);
    }
}

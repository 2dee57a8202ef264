//! Store facade
//!
//! `Store` owns one SQLite connection and exposes the public operations:
//! `auto_migrate`, `save`, `where_one`, `where_all` and `delete`.
//!
//! ## Logging Ownership
//!
//! The store owns lifecycle logging for its public operations:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! The migrator and codec use only `tracing::debug!()` / `tracing::warn!()`.
//!
//! ## Conditions
//!
//! Read and delete conditions are caller-supplied SQL boolean expressions
//! placed after `WHERE`, with positional parameters bound separately. They
//! are not validated.

use crate::codec::{decode_row, encode_record, query_rows, RawRow};
use crate::db::{self, quote_ident};
use crate::errors::{from_rusqlite, missing_table_name, unknown_table, Result};
use crate::integrity::{self, DanglingReference};
use crate::migrator::{self, ExistingColumn, MigrationReport};
use crate::options::StoreOptions;
use rowgraph_core::errors::RowGraphError;
use rowgraph_core::model::{Fields, Model, Persistable, RefToken, Template};
use rowgraph_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::{Connection, Params};
use std::path::Path;
use std::time::Instant;

/// Callback run after each successful top-level save
///
/// Receives the saved instance (with its id already assigned) and the
/// token of its row. Closures of the right shape implement it.
pub trait SaveObserver: Send {
    fn on_save(&self, model: &dyn Model, token: &RefToken);
}

impl<F> SaveObserver for F
where
    F: Fn(&dyn Model, &RefToken) + Send,
{
    fn on_save(&self, model: &dyn Model, token: &RefToken) {
        self(model, token)
    }
}

/// Handle to one SQLite-backed store
///
/// Operations are synchronous and take `&self`; the handle is `Send` but
/// not `Sync`, so concurrent writers must be serialized by the caller.
pub struct Store {
    conn: Connection,
    observers: Vec<Box<dyn SaveObserver>>,
}

impl Store {
    /// Open (creating if needed) a store file with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(&StoreOptions::new(path))
    }

    pub fn open_with(options: &StoreOptions) -> Result<Self> {
        let conn = db::open_with(options)?;
        tracing::debug!(path = %options.path.display(), "opened store");
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(db::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            observers: Vec::new(),
        }
    }

    /// Underlying connection, for ad-hoc queries
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the connection, surfacing any error `Drop` would swallow
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| from_rusqlite(e))
    }

    /// Register a save observer
    pub fn on_save<O: SaveObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    /// Migrate the table of each template, in order
    ///
    /// Templates are default-constructed instances of their model types.
    ///
    /// # Errors
    ///
    /// `ERR_SCHEMA` if a template declares no table name. Templates before
    /// it have already been migrated.
    pub fn auto_migrate(&self, templates: &[&dyn Model]) -> Result<Vec<MigrationReport>> {
        log_op_start!("auto_migrate", template_count = templates.len());
        let start = Instant::now();

        let result = self.auto_migrate_impl(templates).map_err(|e| {
            log_op_error!(
                "auto_migrate",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "auto_migrate",
            duration_ms = start.elapsed().as_millis() as u64,
            template_count = templates.len()
        );
        Ok(result)
    }

    fn auto_migrate_impl(&self, templates: &[&dyn Model]) -> Result<Vec<MigrationReport>> {
        let mut reports = Vec::with_capacity(templates.len());
        for (index, model) in templates.iter().enumerate() {
            if model.table_name().is_empty() {
                return Err(missing_table_name(&format!("template #{}", index)));
            }
            reports.push(migrator::auto_migrate(&self.conn, &Template::of(*model))?);
        }
        Ok(reports)
    }

    /// Persist one instance and everything it owns
    ///
    /// The whole cascade is one transaction. On success the assigned id is
    /// written back onto `model` and observers are notified.
    ///
    /// # Errors
    ///
    /// - `ERR_SCHEMA`: the model declares no table name
    /// - `ERR_UNKNOWN_TABLE`: its table (or a nested model's) was never migrated
    /// - `ERR_UNSUPPORTED_TYPE`: a field value cannot be stored
    pub fn save(&self, model: &mut dyn Model) -> Result<RefToken> {
        let table = model.table_name().to_string();
        log_op_start!("save", table = %table);
        let start = Instant::now();

        let token = self.save_impl(model).map_err(|e| {
            log_op_error!(
                "save",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                table = %table
            );
            e
        })?;

        log_op_end!(
            "save",
            duration_ms = start.elapsed().as_millis() as u64,
            table = %table,
            row_id = token.row_id
        );

        for observer in &self.observers {
            observer.on_save(&*model, &token);
        }
        Ok(token)
    }

    fn save_impl(&self, model: &mut dyn Model) -> Result<RefToken> {
        let table = model.table_name();
        if table.is_empty() {
            return Err(missing_table_name("<unnamed model>"));
        }
        if !migrator::table_exists(&self.conn, table)? {
            return Err(unknown_table(table));
        }

        let record = model.to_record();
        let tx = self.conn.unchecked_transaction().map_err(from_rusqlite)?;
        let token = encode_record(&tx, &record)?;
        tx.commit().map_err(from_rusqlite)?;

        model.set_id(token.row_id);
        Ok(token)
    }

    /// Save several instances, each in its own transaction
    ///
    /// Stops at the first failure; instances saved before it stay saved.
    pub fn save_all(&self, models: &mut [&mut dyn Model]) -> Result<Vec<RefToken>> {
        models.iter_mut().map(|model| self.save(&mut **model)).collect()
    }

    /// First row of `M`'s table matching `condition`, if any
    ///
    /// An empty condition matches every row.
    pub fn where_one<M: Persistable, P: Params>(
        &self,
        condition: &str,
        params: P,
    ) -> Result<Option<M>> {
        let table = template_table::<M>()?;
        log_op_start!("where_one", table = %table);
        let start = Instant::now();

        let result = self
            .select_raw(&table, condition, params)
            .and_then(|rows| match rows.into_iter().next() {
                Some(row) => self.materialize::<M>(row).map(Some),
                None => Ok(None),
            })
            .map_err(|e| {
                log_op_error!(
                    "where_one",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    table = %table
                );
                e
            })?;

        log_op_end!(
            "where_one",
            duration_ms = start.elapsed().as_millis() as u64,
            table = %table,
            row_count = usize::from(result.is_some())
        );
        Ok(result)
    }

    /// Like `where_one`, returning `default` when nothing matches
    pub fn where_one_or<M: Persistable, P: Params>(
        &self,
        condition: &str,
        params: P,
        default: M,
    ) -> Result<M> {
        Ok(self.where_one(condition, params)?.unwrap_or(default))
    }

    /// Every row of `M`'s table matching `condition`, in storage order
    ///
    /// # Errors
    ///
    /// `ERR_MISSING_REFERENCE` if a reference column of a matched row points
    /// at a deleted row.
    pub fn where_all<M: Persistable, P: Params>(&self, condition: &str, params: P) -> Result<Vec<M>> {
        let table = template_table::<M>()?;
        log_op_start!("where_all", table = %table);
        let start = Instant::now();

        let result = self
            .select_raw(&table, condition, params)
            .and_then(|rows| {
                rows.into_iter()
                    .map(|row| self.materialize::<M>(row))
                    .collect::<Result<Vec<M>>>()
            })
            .map_err(|e| {
                log_op_error!(
                    "where_all",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    table = %table
                );
                e
            })?;

        log_op_end!(
            "where_all",
            duration_ms = start.elapsed().as_millis() as u64,
            table = %table,
            row_count = result.len()
        );
        Ok(result)
    }

    /// Like `where_all`, returning `default` when nothing matches
    pub fn where_all_or<M: Persistable, P: Params>(
        &self,
        condition: &str,
        params: P,
        default: Vec<M>,
    ) -> Result<Vec<M>> {
        let found = self.where_all(condition, params)?;
        Ok(if found.is_empty() { default } else { found })
    }

    /// Decoded rows of any table, without a model type
    pub fn fetch_rows<P: Params>(&self, table: &str, condition: &str, params: P) -> Result<Vec<Fields>> {
        self.select_raw(table, condition, params)?
            .into_iter()
            .map(|row| decode_row(&self.conn, row))
            .collect()
    }

    /// Delete rows of `model`'s table
    ///
    /// An instance with an id deletes exactly its own row and ignores
    /// `condition`. Otherwise `condition` selects the rows; an empty
    /// condition deletes everything, and only when `allow_empty` is set.
    /// Nested rows are never deleted along with their owner.
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// `ERR_CONDITION_REQUIRED` for an unscoped delete without opt-in.
    pub fn delete<P: Params>(
        &self,
        model: &dyn Model,
        condition: &str,
        params: P,
        allow_empty: bool,
    ) -> Result<usize> {
        let table = model.table_name().to_string();
        log_op_start!("delete", table = %table);
        let start = Instant::now();

        let deleted = self
            .delete_impl(model, condition, params, allow_empty)
            .map_err(|e| {
                log_op_error!(
                    "delete",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    table = %table
                );
                e
            })?;

        log_op_end!(
            "delete",
            duration_ms = start.elapsed().as_millis() as u64,
            table = %table,
            row_count = deleted
        );
        Ok(deleted)
    }

    fn delete_impl<P: Params>(
        &self,
        model: &dyn Model,
        condition: &str,
        params: P,
        allow_empty: bool,
    ) -> Result<usize> {
        let table = model.table_name();
        if table.is_empty() {
            return Err(missing_table_name("<unnamed model>"));
        }
        if !migrator::table_exists(&self.conn, table)? {
            return Err(unknown_table(table));
        }

        let target = quote_ident(table);
        let result = if let Some(id) = model.id() {
            self.conn
                .execute(&format!("DELETE FROM {} WHERE id = ?1", target), [id])
        } else if condition.trim().is_empty() {
            if !allow_empty {
                return Err(RowGraphError::ConditionRequired {
                    table: table.to_string(),
                }
                .into());
            }
            self.conn.execute(&format!("DELETE FROM {}", target), [])
        } else {
            self.conn
                .execute(&format!("DELETE FROM {} WHERE {}", target, condition), params)
        };
        result.map_err(from_rusqlite)
    }

    /// User tables in the store
    pub fn tables(&self) -> Result<Vec<String>> {
        migrator::list_tables(&self.conn)
    }

    /// Live columns of a table
    pub fn columns(&self, table: &str) -> Result<Vec<ExistingColumn>> {
        if !migrator::table_exists(&self.conn, table)? {
            return Err(unknown_table(table));
        }
        migrator::table_columns(&self.conn, table)
    }

    /// Find stored tokens whose target rows are gone
    pub fn check_references(&self, tables: &[&str]) -> Result<Vec<DanglingReference>> {
        integrity::check_references(&self.conn, tables)
    }

    fn select_raw<P: Params>(&self, table: &str, condition: &str, params: P) -> Result<Vec<RawRow>> {
        if !migrator::table_exists(&self.conn, table)? {
            return Err(unknown_table(table));
        }
        let target = quote_ident(table);
        if condition.trim().is_empty() {
            query_rows(&self.conn, &format!("SELECT * FROM {}", target), [])
        } else {
            let sql = format!("SELECT * FROM {} WHERE {}", target, condition);
            query_rows(&self.conn, &sql, params)
        }
    }

    fn materialize<M: Persistable>(&self, row: RawRow) -> Result<M> {
        let fields = decode_row(&self.conn, row)?;
        Ok(M::from_fields(fields)?)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.conn.path())
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn template_table<M: Persistable>() -> Result<String> {
    let table = M::default().table_name().to_string();
    if table.is_empty() {
        return Err(missing_table_name(std::any::type_name::<M>()));
    }
    Ok(table)
}

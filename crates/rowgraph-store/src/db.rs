//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections, plus
//! the identifier quoting every dynamically built statement goes through.

use crate::errors::{from_rusqlite, io_error, Result};
use crate::options::StoreOptions;
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Open and configure a connection as described by `options`
pub fn open_with(options: &StoreOptions) -> Result<Connection> {
    if options.create_parent_dirs {
        if let Some(parent) = options.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| io_error("create_parent_dirs", e))?;
            }
        }
    }
    let conn = open(&options.path)?;
    configure(&conn, options)?;
    Ok(conn)
}

/// Configure a connection
pub fn configure(conn: &Connection, options: &StoreOptions) -> Result<()> {
    if options.journal_mode_wal {
        // journal_mode reports the resulting mode as a row
        let _mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
    }
    Ok(())
}

/// Quote an identifier (table or column name) for SQL text
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

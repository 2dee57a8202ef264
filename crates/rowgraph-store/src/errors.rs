//! Error handling for rowgraph-store
//!
//! Wraps rowgraph-core ExError with store-specific helpers

use rowgraph_core::errors::{ExError, ExErrorKind, RowGraphError};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a blob serialization error
pub fn serialization_error(operation: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Template declares no table
pub fn missing_table_name(model: &str) -> ExError {
    RowGraphError::MissingTableName {
        model: model.to_string(),
    }
    .into()
}

/// Save or read against a table that was never migrated
pub fn unknown_table(table: &str) -> ExError {
    RowGraphError::UnknownTable {
        table: table.to_string(),
    }
    .into()
}

/// Value that cannot be stored in the given field
pub fn unsupported_type(table: &str, field: &str, reason: impl Into<String>) -> ExError {
    RowGraphError::UnsupportedType {
        table: table.to_string(),
        field: field.to_string(),
        reason: reason.into(),
    }
    .into()
}

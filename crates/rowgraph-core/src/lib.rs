//! rowgraph core - value model, templates and shared facilities
//!
//! This crate provides the storage-independent half of the rowgraph
//! persistence engine:
//! - The closed `Value` variant and the `Record` shape of a model instance
//! - `Model` / `FromFields` traits implemented by application records
//! - Template field descriptors and the pure column derivation step
//! - Reference token formatting and parsing
//! - The canonical error facility and structured logging facility

pub mod errors;
pub mod logging_facility;
pub mod model;

// Logging macros expand to paths inside this re-export
pub use rowgraph_core_types as core_types;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, RowGraphError};
pub use model::{
    derive_columns, ColumnSpec, ColumnType, FieldDescriptor, FieldKind, Fields, FromFields,
    FromValue, Model, Persistable, Record, RefToken, Template, Value,
};

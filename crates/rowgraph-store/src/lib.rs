//! rowgraph store - SQLite persistence for schema-less model graphs
//!
//! Provides:
//! - Schema migration derived from model templates (additive and destructive)
//! - Codec: cascading row encoding, recursive decoding, opaque container blobs
//! - `Store`: the save / where / delete / auto_migrate facade
//! - A reference integrity diagnostic
//!
//! References between rows are plain text tokens. Nothing enforces them:
//! deleting a row never cascades. A reference column pointing at it fails
//! only when decoded (`ERR_MISSING_REFERENCE`); inside a container the raw
//! token is kept instead. Re-saving a model always inserts
//! fresh rows for its nested models; earlier nested rows stay behind.

pub mod codec;
pub mod db;
pub mod errors;
pub mod integrity;
pub mod migrator;
pub mod options;
pub mod store;

// Re-export key types
pub use errors::Result;
pub use migrator::MigrationReport;
pub use options::StoreOptions;
pub use store::{SaveObserver, Store};

pub mod check;
pub mod dump;
pub mod tables;

use rowgraph_store::{Store, StoreOptions};
use std::path::Path;

/// Default store location, relative to the working directory
pub const DEFAULT_DB: &str = ".rowgraph/store.db";

/// Open an existing store file for inspection
///
/// Never creates a store: a missing file is an error.
pub fn open_existing(db: &str) -> Result<Store, Box<dyn std::error::Error>> {
    if !Path::new(db).exists() {
        return Err(format!("store not found: {}", db).into());
    }
    let options = StoreOptions::new(db)
        .create_parent_dirs(false)
        .journal_mode_wal(false);
    Ok(Store::open_with(&options)?)
}

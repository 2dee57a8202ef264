//! Store configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// How to open the backing database
///
/// Deserializable so hosts can embed it in their own configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreOptions {
    /// Database file path
    pub path: PathBuf,
    /// Create missing parent directories of `path`
    #[serde(default = "default_true")]
    pub create_parent_dirs: bool,
    /// Switch the database to write-ahead logging
    #[serde(default = "default_true")]
    pub journal_mode_wal: bool,
}

fn default_true() -> bool {
    true
}

impl StoreOptions {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            create_parent_dirs: true,
            journal_mode_wal: true,
        }
    }

    pub fn create_parent_dirs(mut self, enabled: bool) -> Self {
        self.create_parent_dirs = enabled;
        self
    }

    pub fn journal_mode_wal(mut self, enabled: bool) -> Self {
        self.journal_mode_wal = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let options: StoreOptions =
            serde_json::from_str(r#"{ "path": "data/bridge.db" }"#).unwrap();
        assert_eq!(options, StoreOptions::new("data/bridge.db"));
    }

    #[test]
    fn test_overrides_from_json() {
        let options: StoreOptions = serde_json::from_str(
            r#"{ "path": "bridge.db", "create_parent_dirs": false, "journal_mode_wal": false }"#,
        )
        .unwrap();
        assert!(!options.create_parent_dirs);
        assert!(!options.journal_mode_wal);
    }
}

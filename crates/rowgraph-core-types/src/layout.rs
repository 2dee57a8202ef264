//! On-disk naming conventions
//!
//! Every persisted column name declares how its value is decoded:
//!
//! | column name            | stored value                      |
//! |------------------------|-----------------------------------|
//! | `id`                   | store-assigned row identity       |
//! | `<field>`              | scalar, stored as-is              |
//! | `FOREIGN_KEY_<field>`  | reference token to another row    |
//! | `PICKLE_BYTES_<field>` | opaque serialized container       |
//!
//! Reference tokens reuse the foreign key prefix:
//! `FOREIGN_KEY_<row-id>@<table-name>`.

/// Identity column present on every table
pub const ID_COLUMN: &str = "id";

/// Prefix for reference columns and for reference tokens
pub const FOREIGN_KEY_PREFIX: &str = "FOREIGN_KEY_";

/// Prefix for columns holding an opaque container blob
pub const BLOB_PREFIX: &str = "PICKLE_BYTES_";

/// Separator between row id and table name inside a reference token
pub const TOKEN_TABLE_SEPARATOR: char = '@';

/// Check whether a column name is the identity column
pub fn is_id_column(name: &str) -> bool {
    name.eq_ignore_ascii_case(ID_COLUMN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_are_distinct() {
        assert_ne!(FOREIGN_KEY_PREFIX, BLOB_PREFIX);
        assert!(!FOREIGN_KEY_PREFIX.starts_with(BLOB_PREFIX));
        assert!(!BLOB_PREFIX.starts_with(FOREIGN_KEY_PREFIX));
    }

    #[test]
    fn test_id_column_case_insensitive() {
        assert!(is_id_column("id"));
        assert!(is_id_column("ID"));
        assert!(!is_id_column("uid"));
    }
}

//! Reference tokens
//!
//! A reference token names one row of one table:
//! `FOREIGN_KEY_<row-id>@<table-name>`. Tokens are plain text with no
//! integrity enforcement behind them; deleting the target row leaves every
//! token pointing at it dangling until it is decoded.

use crate::errors::{Result, RowGraphError};
use rowgraph_core_types::layout::{FOREIGN_KEY_PREFIX, TOKEN_TABLE_SEPARATOR};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefToken {
    pub row_id: i64,
    pub table: String,
}

impl RefToken {
    pub fn new(row_id: i64, table: impl Into<String>) -> Self {
        Self {
            row_id,
            table: table.into(),
        }
    }

    /// Parse the textual form
    pub fn parse(text: &str) -> Result<Self> {
        let malformed = || RowGraphError::MalformedToken {
            token: text.to_string(),
        };
        let body = text.strip_prefix(FOREIGN_KEY_PREFIX).ok_or_else(malformed)?;
        let (id, table) = body.split_once(TOKEN_TABLE_SEPARATOR).ok_or_else(malformed)?;
        let row_id = id.parse::<i64>().map_err(|_| malformed())?;
        if table.is_empty() {
            return Err(malformed());
        }
        Ok(Self::new(row_id, table))
    }
}

impl fmt::Display for RefToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            FOREIGN_KEY_PREFIX, self.row_id, TOKEN_TABLE_SEPARATOR, self.table
        )
    }
}

impl FromStr for RefToken {
    type Err = RowGraphError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

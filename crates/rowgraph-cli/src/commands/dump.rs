//! Dump command
//!
//! Usage: rowgraph dump <TABLE> [--where <CONDITION>] [--db <PATH>]
//!
//! Rows are fully decoded: references are followed and blobs expanded, so
//! each output line is the whole graph rooted at that row.

use clap::Args;
use rowgraph_core::Value;

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Table to dump
    pub table: String,

    /// SQL condition selecting rows (default: all rows)
    #[arg(long = "where")]
    pub condition: Option<String>,

    #[arg(long, default_value = super::DEFAULT_DB)]
    pub db: String,
}

/// Execute dump command
pub fn execute(args: DumpArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_existing(&args.db)?;
    let condition = args.condition.as_deref().unwrap_or("");

    for fields in store.fetch_rows(&args.table, condition, [])? {
        let row = Value::Map(fields.into_inner());
        println!("{}", serde_json::to_string(&row.to_json())?);
    }

    Ok(())
}

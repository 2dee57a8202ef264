//! Tables command
//!
//! Usage: rowgraph tables [--db <PATH>]

use clap::Args;
use rowgraph_store::db::quote_ident;

#[derive(Debug, Args)]
pub struct TablesArgs {
    #[arg(long, default_value = super::DEFAULT_DB)]
    pub db: String,
}

/// Execute tables command
pub fn execute(args: TablesArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_existing(&args.db)?;

    for table in store.tables()? {
        let rows: i64 = store.connection().query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(&table)),
            [],
            |row| row.get(0),
        )?;
        let columns = store.columns(&table)?.len();
        println!("{}\t{} rows\t{} columns", table, rows, columns);
    }

    Ok(())
}

//! Check command
//!
//! Usage: rowgraph check [TABLE]... [--db <PATH>]
//!
//! Scans the named tables (default: every table) for dangling reference
//! tokens. Exits with an error when any are found.

use clap::Args;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Tables to scan (default: all)
    pub tables: Vec<String>,

    #[arg(long, default_value = super::DEFAULT_DB)]
    pub db: String,
}

/// Execute check command
pub fn execute(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_existing(&args.db)?;

    let tables = if args.tables.is_empty() {
        store.tables()?
    } else {
        args.tables
    };
    let names: Vec<&str> = tables.iter().map(String::as_str).collect();

    let dangling = store.check_references(&names)?;
    for reference in &dangling {
        println!(
            "{}#{} {}: {}",
            reference.table, reference.row_id, reference.column, reference.token
        );
    }

    if !dangling.is_empty() {
        return Err(format!("{} dangling reference(s)", dangling.len()).into());
    }
    println!("✓ {} table(s) checked, no dangling references", names.len());
    Ok(())
}

//! rowgraph CLI
//!
//! Command-line inspection of a rowgraph store file

use clap::{Parser, Subcommand};
use rowgraph_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "rowgraph")]
#[command(about = "rowgraph - Inspect SQLite-backed model graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List tables with their row counts
    Tables(commands::tables::TablesArgs),
    /// Print decoded rows of a table as JSON lines
    Dump(commands::dump::DumpArgs),
    /// Report reference tokens whose rows no longer exist
    Check(commands::check::CheckArgs),
}

fn main() {
    init(Profile::Development);
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Tables(args) => commands::tables::execute(args),
        Commands::Dump(args) => commands::dump::execute(args),
        Commands::Check(args) => commands::check::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

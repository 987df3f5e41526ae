//! isamdb CLI
//!
//! Command-line tools for legacy ISAM data files.
//!
//! # Commands
//!
//! - `inspect` - Display header fields and record statistics
//! - `dump` - Print records as hex
//! - `find` - Search records by leading key bytes
//! - `export` - Write a store image to a new file

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Legacy ISAM data file tools.
#[derive(Parser)]
#[command(name = "isamdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Declared record length in bytes
    #[arg(global = true, short = 'r', long)]
    record_length: Option<u16>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display header fields and record statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print records as hex
    Dump {
        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Index of the first record to print
        #[arg(short, long, default_value = "0")]
        offset: usize,
    },

    /// Search records by leading key bytes
    Find {
        /// Key to search for
        key: String,

        /// Interpret the key as hex instead of text
        #[arg(long)]
        hex: bool,
    },

    /// Write the store image to a new file
    Export {
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Data file path required for inspect")?;
            commands::inspect::run(&path, cli.record_length, &format)?;
        }
        Commands::Dump { limit, offset } => {
            let path = cli.path.ok_or("Data file path required for dump")?;
            let record_length = cli.record_length.ok_or("Record length required for dump")?;
            commands::dump::run(&path, record_length, offset, limit)?;
        }
        Commands::Find { key, hex } => {
            let path = cli.path.ok_or("Data file path required for find")?;
            let record_length = cli.record_length.ok_or("Record length required for find")?;
            commands::find::run(&path, record_length, &key, hex)?;
        }
        Commands::Export { output } => {
            let path = cli.path.ok_or("Data file path required for export")?;
            let record_length = cli
                .record_length
                .ok_or("Record length required for export")?;
            commands::export::run(&path, record_length, &output)?;
        }
        Commands::Version => {
            println!("isamdb CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("isamdb Core v{}", isamdb_core::VERSION);
        }
    }

    Ok(())
}

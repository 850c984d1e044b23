//! WideRepo CLI
//!
//! Command-line tools for inspecting how repository queries are planned.
//!
//! # Commands
//!
//! - `explain` - Print the plan a query method resolves to
//! - `query` - Run a query method against a JSON-seeded in-memory store
//! - `version` - Show version information

mod commands;
mod documents;

use clap::{Parser, Subcommand};
use commands::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// WideRepo query planning tools.
#[derive(Parser)]
#[command(name = "widerepo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Entity schema (JSON)
    #[arg(global = true, short, long)]
    schema: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the plan a query method resolves to
    Explain {
        /// Query description (JSON)
        #[arg(short, long)]
        query: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Run a query method against an in-memory store
    Query {
        /// Query description (JSON)
        #[arg(short, long)]
        query: PathBuf,

        /// Seed items in wire form (JSON array)
        #[arg(short, long)]
        data: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
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
        Commands::Explain { query, format } => {
            let schema = cli.schema.ok_or("Schema path required for explain")?;
            commands::explain::run(&schema, &query, format)?;
        }
        Commands::Query {
            query,
            data,
            format,
        } => {
            let schema = cli.schema.ok_or("Schema path required for query")?;
            commands::query::run(&schema, &data, &query, format)?;
        }
        Commands::Version => {
            println!("WideRepo CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("WideRepo Core v{}", widerepo_core::VERSION);
        }
    }

    Ok(())
}

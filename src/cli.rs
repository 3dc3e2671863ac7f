//! Command-line interface built on clap.
//!
//! Defines [`Cli`] with the [`Command`] subcommands (classify, batch, graph,
//! demo) and global flags (--lookahead, --json, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// fincat: label income-statement line items with their statement section.
#[derive(Debug, Parser)]
#[command(name = "fincat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Rows of lookahead (capped at 4). Overrides fincat.toml.
    #[arg(long, short = 'l', global = true)]
    pub lookahead: Option<usize>,

    /// Print JSON reports instead of tables.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Path to the configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify the rows of one statement file (.json or .toml).
    Classify {
        /// Statement file.
        file: PathBuf,

        /// Also print per-category column totals.
        #[arg(long)]
        totals: bool,
    },

    /// Classify several statement files concurrently.
    Batch {
        /// Statement files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show the transition graph and its verification issues.
    Graph,

    /// Classify a built-in sample statement.
    Demo,
}

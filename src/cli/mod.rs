//! CLI command definitions and handlers

mod annotate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Annotrace - blame-driven line provenance tracing
#[derive(Parser, Debug)]
#[command(name = "annotrace")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to repository (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trace the deleted lines of a set of bug-fixing commits
    Annotate {
        /// JSON file mapping issue ids to fix commit records
        #[arg(long)]
        issues: PathBuf,

        /// Maximum number of ancestor generations to trace through
        #[arg(long, default_value = "3")]
        depth: u32,

        /// Diff context width (hunk grouping only)
        #[arg(long, default_value = "3")]
        context: u32,

        /// Directory the JSON results are written to
        #[arg(long)]
        result_path: Option<PathBuf>,

        /// Keep tracing remaining ancestors after one chain is exhausted
        #[arg(long)]
        trace_all_ancestors: bool,
    },

    /// Show version info
    Version,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Annotate {
            issues,
            depth,
            context,
            result_path,
            trace_all_ancestors,
        } => annotate::run(
            &cli.path,
            &issues,
            depth,
            context,
            result_path.as_deref(),
            trace_all_ancestors,
        ),

        Commands::Version => {
            println!("annotrace {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Strata - versioned, reversible schema migrations for DuckDB
#[derive(Parser, Debug)]
#[command(name = "migrate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Named target from strata.yml (falls back to STRATA_TARGET)
    #[arg(short, long, global = true)]
    pub target: Option<String>,

    /// Override the database path from the config
    #[arg(long, global = true)]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply all pending migrations
    #[command(visible_alias = "migrate")]
    Up,

    /// Roll back the most recently applied migrations
    Down(DownArgs),

    /// Show applied, pending, and orphaned migrations
    Status(StatusArgs),

    /// Scaffold a new migration directory
    New(NewArgs),
}

/// Arguments for the down command
#[derive(Args, Debug)]
pub struct DownArgs {
    /// Number of migrations to roll back
    #[arg(default_value_t = 1)]
    pub steps: usize,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Short name for the migration (lowercase letters, digits, underscores)
    pub slug: String,

    /// Write migration.yml marking it irreversible instead of down.sql
    #[arg(long)]
    pub irreversible: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

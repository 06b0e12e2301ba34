//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Ferry - versioned, reversible SQL schema migrations
#[derive(Parser, Debug)]
#[command(name = "ferry")]
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
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./ferry.yml or ./ferry.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory containing migration files
    #[arg(short, long, global = true, env = "FERRY_MIGRATIONS_DIR")]
    pub migrations_dir: Option<String>,

    /// Database type
    #[arg(long, global = true, value_enum, env = "FERRY_DB_TYPE")]
    pub db_type: Option<DbTypeArg>,

    /// DuckDB database path (or :memory:)
    #[arg(short, long, global = true, env = "FERRY_TARGET")]
    pub target: Option<String>,

    /// PostgreSQL host:port
    #[arg(long, global = true, env = "FERRY_ADDRESS")]
    pub address: Option<String>,

    /// PostgreSQL database name
    #[arg(long, global = true, env = "FERRY_DATABASE")]
    pub database: Option<String>,

    /// PostgreSQL user
    #[arg(long, global = true, env = "FERRY_USERNAME")]
    pub username: Option<String>,

    /// PostgreSQL password
    #[arg(long, global = true, env = "FERRY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Database types selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbTypeArg {
    /// DuckDB file or in-memory database
    Duckdb,
    /// PostgreSQL server
    Postgres,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register new migration files and apply every outstanding upgrade
    Up,

    /// Revert the current version with its downgrade
    Down,

    /// Apply every outstanding downgrade, newest first
    Reset,

    /// Show the current schema version
    Version(VersionArgs),
}

/// Arguments for the version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: VersionOutput,
}

/// Version output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOutput {
    /// Human-readable line
    Text,
    /// JSON object
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

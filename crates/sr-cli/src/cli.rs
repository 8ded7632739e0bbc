//! CLI argument definitions using clap derive API

use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// sqlrun - apply a directory of SQL scripts to PostgreSQL
///
/// Without a subcommand every `.sql` file under the scripts directory is
/// executed in lexicographic path order. Every option can also be supplied
/// through the environment variable named in its help text.
#[derive(Parser, Debug)]
#[command(name = "sqlrun")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_negates_reqs = true)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Script runner options
    #[command(flatten)]
    pub run: RunArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Log each script before it is executed
    #[arg(short, long, global = true, env = "DEBUG", value_parser = FalseyValueParser::new())]
    pub debug: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the dependency-ordered execution plan for a SQL directory
    Plan(PlanArgs),
}

/// Arguments for the default script runner
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Database user
    #[arg(long, env = "INPUT_DB_USER", required = true)]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long, env = "INPUT_DB_PASSWORD", required = true, hide_env_values = true)]
    pub db_password: Option<String>,

    /// Database host name, IP address or unix socket directory
    #[arg(long, env = "INPUT_DB_HOST", required = true)]
    pub db_host: Option<String>,

    /// Database port
    #[arg(long, env = "INPUT_DB_PORT", required = true)]
    pub db_port: Option<u16>,

    /// Database name
    #[arg(long, env = "INPUT_DB", required = true)]
    pub db_name: Option<String>,

    /// Directory containing the .sql scripts
    #[arg(long, env = "INPUT_SCRIPTS_DIR", required = true)]
    pub scripts_dir: Option<String>,

    /// Cloud SQL instance connection name; connects via /cloudsql/<instance>
    #[arg(long, env = "INPUT_CLOUD_SQL_INSTANCE")]
    pub cloud_sql_instance: Option<String>,

    /// Connection and per-statement timeout in seconds
    #[arg(long, env = "INPUT_DB_TIMEOUT", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Relations manifest; run scripts in dependency order instead of path order
    #[arg(long, env = "INPUT_RELATIONS_FILE")]
    pub relations: Option<PathBuf>,

    /// Apply all scripts inside one transaction
    #[arg(long, env = "INPUT_SINGLE_TRANSACTION", value_parser = FalseyValueParser::new())]
    pub single_transaction: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Relations manifest to read
    #[arg(short, long, default_value = "../.db-relation.yml")]
    pub relations: PathBuf,

    /// Directory to search for .sql files
    #[arg(short, long, default_value = "../sql")]
    pub sql_dir: PathBuf,

    /// What to print
    #[arg(short, long, value_enum, default_value = "all")]
    pub output: PlanOutput,
}

/// Plan output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOutput {
    /// Execution order followed by the JSON forest
    All,
    /// JSON forest only
    Json,
    /// Execution order only, one id per line
    Order,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

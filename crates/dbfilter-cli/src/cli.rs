use clap::{Args, Parser, Subcommand, ValueEnum};
use dbfilter_query::{Logic, Target};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages, including every skipped condition
    Debug,
    /// Trace-level messages, including every compiled fragment
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "dbfilter")]
#[command(about = "dbfilter - compile filter sets into SQL, MongoDB and Elasticsearch queries")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace). Logs go to stderr.
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (TOML)
    #[arg(short = 'C', long, global = true, env = "DBFILTER_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Level to log at when RUST_LOG is not set
    pub fn level_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::WARN,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a filter set for one target and print it as JSON
    Compile(CompileArgs),

    /// Print a complete Elasticsearch search body
    SearchBody(SearchBodyArgs),
}

/// Where the filter set comes from
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Filter document (JSON); `-` reads stdin
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Override the document's logic (and, or)
    #[arg(long)]
    pub logic: Option<Logic>,
}

#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    /// Target backend (postgres, mysql, mariadb, sqlserver, sqlite, other, mongo, elasticsearch)
    #[arg(short, long)]
    pub target: Target,

    #[command(flatten)]
    pub input: InputArgs,

    /// Parameters already bound earlier in the statement (SQL targets)
    #[arg(long, default_value_t = 0)]
    pub start_index: usize,

    /// Use named `@pN` parameters instead of positional ones (SQL targets)
    #[arg(long)]
    pub named: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SearchBodyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Offset of the first hit
    #[arg(long)]
    pub from: Option<u64>,

    /// Number of hits
    #[arg(long)]
    pub size: Option<u64>,

    /// Sort clauses as a JSON array
    #[arg(long)]
    pub sort: Option<String>,
}

//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use covenant_analyzer::Strategy;
use std::path::PathBuf;

/// Covenant CLI - Find conflicting clauses in contracts.
#[derive(Debug, Parser)]
#[command(name = "covenant")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.covenant/config.toml)
    #[arg(short, long, global = true, env = "COVENANT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract the clause tree of a document
    Scan(ScanArgs),

    /// List the clause pairs that would be sent to the oracle
    Candidates(ScanArgs),

    /// Run the full conflict analysis
    Analyze(AnalyzeArgs),

    /// Show stored analysis runs
    Runs(RunsArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for commands that only read a document.
#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Normalized contract text file
    pub file: PathBuf,
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Normalized contract text file
    pub file: PathBuf,

    /// Ollama endpoint (e.g., http://localhost:11434)
    #[arg(short, long, env = "COVENANT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Model name
    #[arg(short, long, env = "COVENANT_MODEL")]
    pub model: Option<String>,

    /// Voting strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Consistency votes per surviving candidate
    #[arg(long)]
    pub votes: Option<usize>,

    /// Maximum oracle calls in flight
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-call deadline in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// SQLite database to persist the run into
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Run identifier (default: a fresh UUIDv7)
    #[arg(long)]
    pub run_id: Option<String>,
}

/// Arguments for the runs command.
#[derive(Debug, Parser)]
pub struct RunsArgs {
    /// SQLite database holding the runs
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Show the conflicts of this run instead of listing runs
    pub run_id: Option<String>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Write a configuration file
    Init {
        /// Preset to start from
        #[arg(short, long, value_enum, default_value = "default")]
        preset: PresetArg,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

/// Voting strategy argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StrategyArg {
    /// One screening call decides
    Single,
    /// Majority of fresh votes decides
    SelfConsistent,
}

/// Configuration preset argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Balanced defaults
    Default,
    /// Quick screening of large documents
    Aggressive,
    /// Fewer false positives, slower
    Lenient,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<StrategyArg> for Strategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Single => Strategy::Single,
            StrategyArg::SelfConsistent => Strategy::SelfConsistent,
        }
    }
}

//! tree-lint CLI tool.
//!
//! Usage:
//! ```bash
//! tree-lint check [OPTIONS] [PATH]
//! tree-lint resolve
//! tree-lint list-checks
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tree_lint_core::Severity;

mod commands;
mod config_resolver;

/// Runs independent checks over parsed syntax trees
#[derive(Parser)]
#[command(name = "tree-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run checks over `*.tree.json` documents
    Check {
        /// File or directory to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific checks (comma-separated names or ids)
        #[arg(long)]
        checks: Option<String>,

        /// Preset used when no configuration file is found
        #[arg(long, default_value = "recommended")]
        preset: String,

        /// Number of files analyzed in parallel (0 = one per core)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Lowest severity that makes the run exit with status 1
        #[arg(long, default_value = "error")]
        fail_on: FailLevel,
    },

    /// Print the configuration with every property reference resolved
    Resolve {
        /// Directory used for configuration lookup (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List available checks
    ListChecks,
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

/// Severity threshold for the exit status.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FailLevel {
    /// Fail on errors only.
    Error,
    /// Fail on warnings and errors.
    Warning,
    /// Fail on any violation.
    Info,
}

impl From<FailLevel> for Severity {
    fn from(level: FailLevel) -> Self {
        match level {
            FailLevel::Error => Self::Error,
            FailLevel::Warning => Self::Warning,
            FailLevel::Info => Self::Info,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            checks,
            preset,
            jobs,
            fail_on,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            commands::check::run(
                &path,
                &commands::check::CheckArgs {
                    format,
                    checks,
                    preset,
                    jobs,
                    fail_on: fail_on.into(),
                },
                &source,
            )
        }
        Commands::Resolve { path } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            commands::resolve::run(&source)
        }
        Commands::ListChecks => {
            commands::list_checks::run();
            Ok(())
        }
    }
}

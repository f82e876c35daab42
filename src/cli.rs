//! Command-line interface definitions for dupescan.
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory
//! dupescan
//!
//! # Scan a directory with 8 concurrent hashes and JSON output
//! dupescan -j 8 --output json ~/Downloads
//!
//! # Add an exclusion on top of the defaults
//! dupescan -e photos-backup ~/Pictures
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::DEFAULT_MAX_CONCURRENCY;
use crate::scanner::HashAlgorithm;

/// Find files with identical content under a directory.
///
/// Files are grouped by size first; only files that share a size are hashed.
/// Groups of identical files are printed with their content digest.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Increase verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Maximum number of files hashed at the same time
    #[arg(
        short = 'j',
        long,
        value_name = "N",
        env = "DUPESCAN_MAX_CONCURRENCY",
        default_value_t = DEFAULT_MAX_CONCURRENCY
    )]
    pub max_concurrency: usize,

    /// Directory name or glob to skip (can be specified multiple times)
    ///
    /// Added to the built-in list unless --no-default-excludes is given.
    #[arg(short, long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Do not skip the built-in directory list (.git, node_modules, target, ...)
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Content digest algorithm
    #[arg(long, value_enum, env = "DUPESCAN_ALGORITHM", default_value_t = HashAlgorithm::Blake3)]
    pub algorithm: HashAlgorithm,

    /// Confirm every hash group with a byte-by-byte comparison
    #[arg(long)]
    pub paranoid: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

//! dupescan - duplicate file finder
//!
//! Walks a directory tree, groups regular files by size, hashes only the
//! files whose size is shared on a bounded worker pool, and reports every set
//! of files with identical content.
//!
//! The run is all-or-nothing: the first traversal or read error aborts it and
//! no partial report is printed.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, OutputFormat};
use crate::config::ScanConfig;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::JsonOutput;
use crate::progress::Progress;

/// Run a scan as described by `cli`, printing the report to stdout.
///
/// # Errors
///
/// Returns an error if the working directory cannot be determined, an
/// exclusion pattern is invalid, the scan fails or is interrupted, or the
/// report cannot be written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_app_with_output(cli, &mut out)
}

/// Like [`run_app`], writing the report to `out`.
///
/// Nothing is written to `out` unless the whole scan succeeds.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_app_with_output<W: Write>(cli: Cli, out: &mut W) -> anyhow::Result<ExitCode> {
    let root = match cli.path.clone() {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let config = ScanConfig::from_cli(&cli)?;
    log::debug!("Scan configuration: {:?}", config);

    let handler = signal::install_handler();
    let mut finder = DuplicateFinder::new(config.clone()).with_shutdown_flag(handler.get_flag());

    let show_progress = !cli.quiet && !cli.no_progress && cli.output == OutputFormat::Text;
    if show_progress {
        finder = finder.with_progress_callback(Arc::new(Progress::new()));
    }

    let (groups, summary) = finder.find_duplicates(&root)?;

    match cli.output {
        OutputFormat::Text => output::write_report(&groups, &summary, out)
            .context("Failed to write report")?,
        OutputFormat::Json => JsonOutput::new(&groups, &summary, config.algorithm, config.paranoid)
            .write_to(out)
            .context("Failed to write JSON report")?,
    }

    Ok(ExitCode::Success)
}

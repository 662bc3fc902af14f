//! Command-line interface.
//!
//! Parses arguments and drives one run of the pipeline:
//! 1. Validate the target directory
//! 2. Load the filter configuration
//! 3. Scan the directory and apply the filters
//! 4. Build and print the movement plan
//! 5. Execute it (unless `--dry-run`) and print the report

use crate::config::FilterConfig;
use crate::error::{JanitorError, JanitorResult};
use crate::executor::execute_plan_with;
use crate::output::OutputFormatter;
use crate::planner::{MovementPlan, generate_plan};
use crate::report::ExecutionReport;
use crate::scanner::collect_files;
use clap::{ArgAction, Parser};
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sort the files of a directory into one sub-directory per extension.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "file-janitor", version, about)]
pub struct Cli {
    /// Directory to organize. Defaults to the current directory.
    pub directory: Option<PathBuf>,

    /// Print the plan without moving anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Filter configuration file (TOML).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the execution report as JSON to this file.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Do not show a progress bar while moving files.
    #[arg(long)]
    pub no_progress: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The scan found no file to organize.
    NothingToDo,
    /// Dry run: the plan that would have been executed.
    Planned(MovementPlan),
    /// The plan ran; failed moves are in the report.
    Executed(ExecutionReport),
}

impl RunOutcome {
    /// False only when an executed plan had failures.
    pub fn is_success(&self) -> bool {
        match self {
            RunOutcome::Executed(report) => report.is_complete_success(),
            RunOutcome::NothingToDo | RunOutcome::Planned(_) => true,
        }
    }
}

/// Resolves the directory to organize and checks that it is one.
///
/// # Arguments
///
/// * `directory` - Directory from the command line, or `None` for the current
///   directory
///
/// # Errors
///
/// Fails if the path is not an existing directory, or if no path was given
/// and the current directory is unavailable.
pub fn resolve_target(directory: Option<&Path>) -> JanitorResult<PathBuf> {
    let target = match directory {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().map_err(JanitorError::CurrentDirectory)?,
    };

    if !target.is_dir() {
        return Err(JanitorError::InvalidTargetDirectory { path: target });
    }
    Ok(target)
}

/// Runs the whole pipeline for the parsed command line.
///
/// # Errors
///
/// Only conditions that prevent a run from starting (bad target, bad
/// configuration) or from saving its JSON report are errors. Failed moves are
/// part of the returned report.
///
/// # Examples
///
/// ```no_run
/// use file_janitor::cli::{Cli, run_cli};
/// use std::path::PathBuf;
///
/// let cli = Cli {
///     directory: Some(PathBuf::from("/path/to/downloads")),
///     dry_run: true,
///     ..Default::default()
/// };
/// match run_cli(&cli) {
///     Ok(outcome) => println!("success: {}", outcome.is_success()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> JanitorResult<RunOutcome> {
    let root = resolve_target(cli.directory.as_deref())?;
    info!(root = %root.display(), dry_run = cli.dry_run, "starting run");

    let filters = FilterConfig::load(cli.config.as_deref())?.compile()?;
    let filters = match &cli.config {
        Some(path) => filters.protect(path),
        None => filters,
    };

    OutputFormatter::info(&format!("Organizing contents of: {}", root.display()));

    let (files, scan_errors) = collect_files(&root).into_parts();
    let found = files.len();
    let (files, filtered_out) = filters.partition(files, &root);
    for path in &filtered_out {
        debug!(path = %path.display(), "excluded by filter");
    }

    OutputFormatter::scan_summary(&root, found, &scan_errors);
    if !filtered_out.is_empty() {
        OutputFormatter::plain(&format!(
            "{} excluded by filter rules",
            filtered_out.len()
        ));
    }

    if files.is_empty() {
        OutputFormatter::info("No files found to organize.");
        return Ok(RunOutcome::NothingToDo);
    }

    let plan = generate_plan(files, &root);
    OutputFormatter::plan(&plan, &root);

    if cli.dry_run {
        println!();
        OutputFormatter::dry_run_notice("No files were modified.");
        OutputFormatter::plain(&format!(
            "Run 'file-janitor {}' (without --dry-run) to execute the plan.",
            root.display()
        ));
        return Ok(RunOutcome::Planned(plan));
    }

    let progress = if cli.no_progress {
        ProgressBar::hidden()
    } else {
        OutputFormatter::create_progress_bar(plan.len() as u64)
    };
    let report = execute_plan_with(&plan, |operation, _| {
        progress.set_message(operation.bucket_name.clone());
        progress.inc(1);
    });
    progress.finish_and_clear();

    OutputFormatter::report(&report, &root);

    if let Some(path) = &cli.report {
        save_report(&report, &root, path)?;
        OutputFormatter::plain(&format!("Report written to {}", path.display()));
    }

    Ok(RunOutcome::Executed(report))
}

/// Writes `report` as pretty-printed JSON to `path`.
///
/// # Arguments
///
/// * `report` - Report of the finished run
/// * `root` - Directory that was organized, recorded in the document
/// * `path` - Output file, replaced if it exists
///
/// # Errors
///
/// Fails if serialization or the file write fails.
pub fn save_report(report: &ExecutionReport, root: &Path, path: &Path) -> JanitorResult<()> {
    let json = serde_json::to_string_pretty(&report.to_json(root))?;
    fs::write(path, json).map_err(|source| JanitorError::ReportWrite {
        path: path.to_path_buf(),
        source,
    })
}

//! file-janitor - sort the files of a directory into per-extension buckets.
//!
//! A run has three stages, each consuming the previous one's output:
//! [`scanner::collect_files`] lists the regular files of a directory,
//! [`planner::generate_plan`] assigns each one a bucket, and
//! [`executor::execute_plan`] performs the moves, renaming on collisions and
//! collecting an [`ExecutionReport`].

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod output;
pub mod planner;
pub mod report;
pub mod safe_fs;
pub mod scanner;

pub use config::{CompiledFilters, ConfigError, FilterConfig};
pub use error::{JanitorError, JanitorResult};
pub use executor::{OperationOutcome, execute_plan, execute_plan_with, resolve_collision};
pub use planner::{MovementPlan, PlannedOperation, ScannedFile, generate_plan};
pub use report::{ExecutionReport, FailedOperation};
pub use scanner::{FileCollection, ScanError, collect_files};

pub use cli::{Cli, RunOutcome, run_cli};

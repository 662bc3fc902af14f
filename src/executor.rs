//! Plan execution.
//!
//! Applies a [`MovementPlan`] to the filesystem one operation at a time, in
//! plan order. A later move into a bucket sees the files that earlier moves
//! left there, which is what makes collision renaming deterministic.
//!
//! Each operation ends in exactly one of three states:
//!
//! - **success**: the file was moved (possibly under a numbered name)
//! - **failure**: creating the bucket or moving the file failed
//! - **skipped**: the file already sits at its planned destination
//!
//! Failures never stop the run; every operation in the plan is processed.

use crate::planner::{MovementPlan, PlannedOperation};
use crate::report::{ExecutionReport, FailedOperation, ResolvedCollision};
use crate::safe_fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Exclusive upper bound of the numbered suffixes tried on a collision.
pub const MAX_CANDIDATE_INDEX: u32 = 100;

/// The pieces of a destination path used to build numbered alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub parent: PathBuf,
    pub stem: String,
    /// Extension with its leading dot, or empty. Case is preserved.
    pub extension: String,
}

impl Candidate {
    pub fn from_destination(destination: &Path) -> Self {
        Self {
            parent: safe_fs::parent_of(destination),
            stem: destination
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
            extension: destination
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default(),
        }
    }

    /// `parent / "{stem} ({index}){extension}"`
    pub fn numbered(&self, index: u32) -> PathBuf {
        self.parent
            .join(format!("{} ({}){}", self.stem, index, self.extension))
    }

    /// Numbered paths for indices `1..MAX_CANDIDATE_INDEX`, lazily.
    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        (1..MAX_CANDIDATE_INDEX).map(|index| self.numbered(index))
    }
}

/// Picks the path a move into `planned` should actually use.
///
/// Returns `planned` when it is free, otherwise the first free numbered
/// alternative. When all of them are taken, `planned` is returned unchanged
/// and the move itself will report the conflict.
pub fn resolve_collision(planned: &Path) -> PathBuf {
    if !safe_fs::exists(planned) {
        return planned.to_path_buf();
    }

    let candidate = Candidate::from_destination(planned);
    match candidate.paths().find(|path| !safe_fs::exists(path)) {
        Some(free) => free,
        None => {
            warn!(
                destination = %planned.display(),
                "no free numbered name left, keeping the planned destination"
            );
            planned.to_path_buf()
        }
    }
}

/// How a single operation ended.
#[derive(Debug)]
pub enum OperationOutcome {
    /// The file now lives at `destination`.
    Success { destination: PathBuf },
    Failure(FailedOperation),
    Skipped,
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// Performs one planned move and classifies the result.
pub fn process_operation(operation: &PlannedOperation) -> OperationOutcome {
    if operation.source == operation.destination {
        debug!(path = %operation.source.display(), "already in place");
        return OperationOutcome::Skipped;
    }

    let fail = |error| {
        OperationOutcome::Failure(FailedOperation {
            source: operation.source.clone(),
            intended_destination: operation.destination.clone(),
            error,
        })
    };

    let bucket_dir = safe_fs::parent_of(&operation.destination);
    if let Err(e) = safe_fs::create_directories(&bucket_dir) {
        warn!(directory = %bucket_dir.display(), error = %e, "could not create bucket");
        return fail(e);
    }

    let destination = resolve_collision(&operation.destination);
    match safe_fs::rename(&operation.source, &destination) {
        Ok(()) => {
            debug!(
                from = %operation.source.display(),
                to = %destination.display(),
                "moved"
            );
            OperationOutcome::Success { destination }
        }
        Err(e) => {
            warn!(
                from = %operation.source.display(),
                to = %destination.display(),
                error = %e,
                "move failed"
            );
            fail(e)
        }
    }
}

/// Folds one operation's outcome into the report.
fn accumulate(
    report: ExecutionReport,
    operation: &PlannedOperation,
    outcome: OperationOutcome,
) -> ExecutionReport {
    match outcome {
        OperationOutcome::Success { destination } => {
            let report = report.with_processed().with_success();
            if destination == operation.destination {
                report
            } else {
                info!(
                    planned = %operation.destination.display(),
                    actual = %destination.display(),
                    "destination taken, moved under a numbered name"
                );
                report.with_collision(ResolvedCollision {
                    planned: operation.destination.clone(),
                    actual: destination,
                })
            }
        }
        OperationOutcome::Failure(failure) => report.with_processed().with_failure(failure),
        OperationOutcome::Skipped => report.with_processed(),
    }
}

/// Executes every operation of `plan` in order and reports the results.
///
/// # Examples
///
/// ```no_run
/// use file_janitor::executor::execute_plan;
/// use file_janitor::planner::generate_plan;
/// use file_janitor::scanner::collect_files;
/// use std::path::Path;
///
/// let root = Path::new("/path/to/downloads");
/// let plan = generate_plan(collect_files(root).files, root);
/// let report = execute_plan(&plan);
/// println!("{} moved, {} failed", report.success_count(), report.failure_count());
/// ```
pub fn execute_plan(plan: &MovementPlan) -> ExecutionReport {
    execute_plan_with(plan, |_, _| {})
}

/// Like [`execute_plan`], calling `observer` after each operation has been
/// carried out.
pub fn execute_plan_with<F>(plan: &MovementPlan, mut observer: F) -> ExecutionReport
where
    F: FnMut(&PlannedOperation, &OperationOutcome),
{
    let report = plan
        .iter()
        .map(|operation| (operation, process_operation(operation)))
        .inspect(|(operation, outcome)| observer(*operation, outcome))
        .fold(ExecutionReport::start(), |report, (operation, outcome)| {
            accumulate(report, operation, outcome)
        });

    info!(
        processed = report.processed_count(),
        succeeded = report.success_count(),
        failed = report.failure_count(),
        skipped = report.skipped_count(),
        "plan executed"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::generate_plan;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    fn operation(root: &Path, name: &str, bucket: &str) -> PlannedOperation {
        PlannedOperation {
            source: root.join(name),
            destination: root.join(bucket).join(name),
            bucket_name: bucket.to_string(),
        }
    }

    #[test]
    fn test_candidate_from_destination() {
        let candidate = Candidate::from_destination(Path::new("/root/pdf/Report.PDF"));
        assert_eq!(candidate.parent, Path::new("/root/pdf"));
        assert_eq!(candidate.stem, "Report");
        assert_eq!(candidate.extension, ".PDF");
        assert_eq!(candidate.numbered(3), Path::new("/root/pdf/Report (3).PDF"));
    }

    #[test]
    fn test_candidate_without_extension() {
        let candidate = Candidate::from_destination(Path::new("/root/no_extension/Makefile"));
        assert_eq!(candidate.extension, "");
        assert_eq!(
            candidate.numbered(1),
            Path::new("/root/no_extension/Makefile (1)")
        );
    }

    #[test]
    fn test_candidate_range() {
        let candidate = Candidate::from_destination(Path::new("/r/a.txt"));
        let all: Vec<_> = candidate.paths().collect();
        assert_eq!(all.len(), 99);
        assert_eq!(all[0], Path::new("/r/a (1).txt"));
        assert_eq!(all[98], Path::new("/r/a (99).txt"));
    }

    #[test]
    fn test_resolve_collision_free_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let planned = temp_dir.path().join("free.txt");
        assert_eq!(resolve_collision(&planned), planned);
    }

    #[test]
    fn test_resolve_collision_skips_taken_numbers() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("r.txt"), "0").unwrap();
        fs::write(base_path.join("r (1).txt"), "1").unwrap();
        fs::write(base_path.join("r (2).txt"), "2").unwrap();

        let resolved = resolve_collision(&base_path.join("r.txt"));
        assert_eq!(resolved, base_path.join("r (3).txt"));
        assert!(!resolved.exists());
    }

    #[test]
    fn test_resolve_collision_exhausted_falls_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("dup.pdf"), "0").unwrap();
        for i in 1..MAX_CANDIDATE_INDEX {
            fs::write(base_path.join(format!("dup ({i}).pdf")), "x").unwrap();
        }

        let planned = base_path.join("dup.pdf");
        assert_eq!(resolve_collision(&planned), planned);
    }

    #[test]
    fn test_skip_when_source_is_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let in_place = temp_dir.path().join("txt").join("a.txt");
        let op = PlannedOperation {
            source: in_place.clone(),
            destination: in_place,
            bucket_name: "txt".to_string(),
        };

        let outcome = process_operation(&op);
        assert!(outcome.is_skipped());
        assert!(!temp_dir.path().join("txt").exists());
    }

    #[test]
    fn test_missing_source_is_a_failure() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let op = operation(temp_dir.path(), "ghost.txt", "txt");

        match process_operation(&op) {
            OperationOutcome::Failure(failure) => {
                assert_eq!(failure.source, op.source);
                assert_eq!(failure.intended_destination, op.destination);
                assert_eq!(failure.error.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_bucket_creation_failure() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("a.txt"), "a").unwrap();
        // A plain file where the bucket directory should go.
        fs::write(base_path.join("txt"), "blocker").unwrap();

        let report = execute_plan(&MovementPlan {
            operations: vec![operation(base_path, "a.txt", "txt")],
        });

        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.success_count(), 0);
        assert!(base_path.join("a.txt").exists());
    }

    #[test]
    fn test_one_failure_does_not_stop_the_run() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("a.txt"), "a").unwrap();
        fs::write(base_path.join("b.md"), "b").unwrap();

        let plan = MovementPlan {
            operations: vec![
                operation(base_path, "missing.txt", "txt"),
                operation(base_path, "a.txt", "txt"),
                operation(base_path, "b.md", "md"),
            ],
        };
        let mut failed_sources = Vec::new();
        let report = execute_plan_with(&plan, |op, outcome| {
            if outcome.is_failure() {
                failed_sources.push(op.source.clone());
            }
        });

        assert_eq!(failed_sources, vec![base_path.join("missing.txt")]);
        assert_eq!(report.processed_count(), 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert!(base_path.join("txt").join("a.txt").exists());
        assert!(base_path.join("md").join("b.md").exists());
    }

    #[test]
    fn test_collision_is_resolved_and_recorded() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::create_dir(base_path.join("txt")).unwrap();
        fs::write(base_path.join("txt").join("report.txt"), "old").unwrap();
        fs::write(base_path.join("report.txt"), "new").unwrap();

        let plan = generate_plan(vec![base_path.join("report.txt")], base_path);
        let report = execute_plan(&plan);

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.collision_count(), 1);
        assert_eq!(
            report.resolved_collisions()[0].actual,
            base_path.join("txt").join("report (1).txt")
        );
        assert_eq!(
            fs::read_to_string(base_path.join("txt").join("report.txt")).unwrap(),
            "old"
        );
    }

    #[test]
    fn test_observer_sees_operations_in_plan_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        for name in ["b.rs", "a.md", "c.rs"] {
            fs::write(base_path.join(name), name).unwrap();
        }
        let plan = generate_plan(
            vec![
                base_path.join("b.rs"),
                base_path.join("a.md"),
                base_path.join("c.rs"),
            ],
            base_path,
        );

        let mut seen = Vec::new();
        let report = execute_plan_with(&plan, |op, outcome| {
            assert!(outcome.is_success());
            assert!(!outcome.is_failure());
            assert!(!op.source.exists());
            seen.push(op.source.clone());
        });

        let expected: Vec<_> = plan.iter().map(|op| op.source.clone()).collect();
        assert_eq!(seen, expected);
        assert_eq!(report.success_count(), 3);
    }
}

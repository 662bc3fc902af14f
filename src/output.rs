//! Console output.
//!
//! Everything the binary prints to stdout goes through [`OutputFormatter`]:
//! status lines, the phase summaries of a run, and the execution progress bar.

use crate::planner::MovementPlan;
use crate::report::ExecutionReport;
use crate::scanner::ScanError;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Stateless collection of printing helpers with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use file_janitor::output::OutputFormatter;
    /// OutputFormatter::success("All files organized");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an informational message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a bold section header preceded by a blank line.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use file_janitor::output::OutputFormatter;
    /// OutputFormatter::header("PLAN");
    /// ```
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints `message` in yellow with a `[DRY RUN]` prefix.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Progress bar for the execution phase.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use file_janitor::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(10);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("█▓░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }

    /// Phase 1: what the scan found.
    pub fn scan_summary(directory: &Path, file_count: usize, errors: &[ScanError]) {
        Self::header("SCAN");
        Self::plain(&format!(
            "Found {} {} in {}",
            file_count.to_string().green(),
            plural(file_count, "file", "files"),
            directory.display()
        ));

        if !errors.is_empty() {
            Self::warning(&format!(
                "{} {} while scanning:",
                errors.len(),
                plural(errors.len(), "error", "errors")
            ));
            for error in errors {
                Self::error(&format!("  {}", error));
            }
        }
    }

    /// Phase 2: the plan, bucket by bucket, followed by a summary table.
    ///
    /// # Arguments
    ///
    /// * `plan` - The movement plan to display
    /// * `root` - Directory destinations are shown relative to
    pub fn plan(plan: &MovementPlan, root: &Path) {
        Self::header("PLAN");

        let mut current_bucket: Option<&str> = None;
        for operation in plan {
            if current_bucket != Some(operation.bucket_name.as_str()) {
                println!("\n{}/", operation.bucket_name.cyan().bold());
                current_bucket = Some(operation.bucket_name.as_str());
            }
            let name = operation
                .source
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            println!(
                "{:>4} {} {} {}",
                "-",
                name,
                "→".dimmed(),
                relative(&operation.destination, root).display()
            );
        }

        Self::summary_table(&plan.bucket_counts(), plan.len());
    }

    /// Table of buckets and how many files each receives, sorted by name.
    ///
    /// # Arguments
    ///
    /// * `bucket_counts` - Bucket names paired with their file counts
    /// * `total_files` - Total shown in the last row
    pub fn summary_table(bucket_counts: &[(&str, usize)], total_files: usize) {
        Self::header("SUMMARY");

        let mut buckets = bucket_counts.to_vec();
        buckets.sort_by_key(|&(name, _)| name);

        let width = buckets
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max("Bucket".len());

        println!(
            "{:<width$} | {}",
            "Bucket".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (bucket, count) in &buckets {
            println!(
                "{:<width$} | {} {}",
                bucket,
                count.to_string().green(),
                plural(*count, "file", "files"),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files, "file", "files"),
            width = width
        );
    }

    /// Phase 3: the execution report.
    pub fn report(report: &ExecutionReport, root: &Path) {
        Self::header("RESULT");
        println!("  Processed: {}", report.processed_count());
        println!("  Moved:     {}", report.success_count().to_string().green());
        println!("  Skipped:   {}", report.skipped_count().to_string().yellow());
        println!("  Failed:    {}", report.failure_count().to_string().red());

        if report.collision_count() > 0 {
            Self::header("RENAMED TO AVOID COLLISIONS");
            for collision in report.resolved_collisions() {
                println!(
                    "{:>4} {} {} {}",
                    "•",
                    relative(&collision.planned, root).display(),
                    "→".dimmed(),
                    relative(&collision.actual, root).display()
                );
            }
        }

        if !report.failures().is_empty() {
            Self::header("FAILURES");
            for failure in report.failures() {
                Self::error(&format!(
                    "{} → {}: {}",
                    relative(&failure.source, root).display(),
                    relative(&failure.intended_destination, root).display(),
                    failure.error
                ));
            }
        }

        println!();
        if report.is_complete_success() {
            Self::success("Organization complete.");
        } else {
            Self::warning("Some files could not be organized. Please review the failures above.");
        }
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

fn relative<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "file", "files"), "file");
        assert_eq!(plural(0, "file", "files"), "files");
        assert_eq!(plural(2, "file", "files"), "files");
    }

    #[test]
    fn test_relative() {
        let root = Path::new("/data");
        assert_eq!(
            relative(Path::new("/data/txt/a.txt"), root),
            Path::new("txt/a.txt")
        );
        assert_eq!(
            relative(Path::new("/elsewhere/a.txt"), root),
            Path::new("/elsewhere/a.txt")
        );
    }

    #[test]
    fn test_progress_bar_length() {
        let pb = OutputFormatter::create_progress_bar(7);
        assert_eq!(pb.length(), Some(7));
        pb.finish_and_clear();
    }
}

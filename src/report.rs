//! Execution reporting.
//!
//! [`ExecutionReport`] is built by a strict left-to-right fold over the plan,
//! one step per operation. Its counters only move forward, and the skipped
//! count is derived rather than stored.

use serde_json::{Value, json};
use std::io;
use std::path::{Path, PathBuf};

/// A move that was attempted and failed.
#[derive(Debug)]
pub struct FailedOperation {
    pub source: PathBuf,
    /// The planned destination, before any collision renaming.
    pub intended_destination: PathBuf,
    pub error: io::Error,
}

impl FailedOperation {
    fn to_json(&self) -> Value {
        json!({
            "source": self.source.to_string_lossy(),
            "intended_destination": self.intended_destination.to_string_lossy(),
            "error_kind": format!("{:?}", self.error.kind()),
            "os_error": self.error.raw_os_error(),
            "message": self.error.to_string(),
        })
    }
}

/// A move that landed somewhere other than its planned destination because
/// that destination was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCollision {
    pub planned: PathBuf,
    pub actual: PathBuf,
}

/// Summary of a plan execution.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    processed_count: usize,
    success_count: usize,
    failures: Vec<FailedOperation>,
    resolved_collisions: Vec<ResolvedCollision>,
}

impl ExecutionReport {
    /// An empty accumulator.
    pub fn start() -> Self {
        Self::default()
    }

    pub fn with_processed(mut self) -> Self {
        self.processed_count += 1;
        self
    }

    pub fn with_success(mut self) -> Self {
        self.success_count += 1;
        self
    }

    pub fn with_failure(mut self, failure: FailedOperation) -> Self {
        self.failures.push(failure);
        self
    }

    pub fn with_collision(mut self, collision: ResolvedCollision) -> Self {
        self.resolved_collisions.push(collision);
        self
    }

    pub fn processed_count(&self) -> usize {
        self.processed_count
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Operations that needed no move because the file was already in place.
    pub fn skipped_count(&self) -> usize {
        self.processed_count - self.success_count - self.failures.len()
    }

    pub fn failures(&self) -> &[FailedOperation] {
        &self.failures
    }

    pub fn collision_count(&self) -> usize {
        self.resolved_collisions.len()
    }

    pub fn resolved_collisions(&self) -> &[ResolvedCollision] {
        &self.resolved_collisions
    }

    /// True if no operation failed.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Renders the report as JSON, stamped with the current UTC time.
    pub fn to_json(&self, root: &Path) -> Value {
        json!({
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "root": root.to_string_lossy(),
            "processed": self.processed_count,
            "succeeded": self.success_count,
            "failed": self.failure_count(),
            "skipped": self.skipped_count(),
            "failures": self.failures.iter().map(FailedOperation::to_json).collect::<Vec<_>>(),
            "collisions": self.resolved_collisions.iter().map(|c| {
                json!({
                    "planned": c.planned.to_string_lossy(),
                    "actual": c.actual.to_string_lossy(),
                })
            }).collect::<Vec<_>>(),
        })
    }
}

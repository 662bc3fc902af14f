//! Movement planning.
//!
//! Turns a list of file paths into an ordered plan of moves, one per file, each
//! into a bucket directory named after the file's lowercased extension.
//!
//! # Examples
//!
//! ```
//! use file_janitor::planner::generate_plan;
//! use std::path::{Path, PathBuf};
//!
//! let files = vec![PathBuf::from("/in/a.TXT"), PathBuf::from("/in/c")];
//! let plan = generate_plan(files, Path::new("/in"));
//!
//! assert_eq!(plan.len(), 2);
//! assert_eq!(plan.operations[0].bucket_name, "no_extension");
//! assert_eq!(plan.operations[1].destination, Path::new("/in/txt/a.TXT"));
//! ```

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Bucket used for files without an extension.
pub const NO_EXTENSION_BUCKET: &str = "no_extension";

/// A path paired with its normalized extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// Lowercased extension with its leading dot, or empty.
    pub extension: String,
}

impl ScannedFile {
    /// Decorates `path` with its normalized extension.
    ///
    /// # Example
    ///
    /// ```
    /// use file_janitor::planner::ScannedFile;
    /// use std::path::PathBuf;
    ///
    /// let file = ScannedFile::new(PathBuf::from("Report.PDF"));
    /// assert_eq!(file.extension, ".pdf");
    /// assert_eq!(file.bucket_name(), "pdf");
    /// ```
    pub fn new(path: PathBuf) -> Self {
        let extension = normalize_extension(&path);
        Self { path, extension }
    }

    /// Bucket directory name for this file.
    pub fn bucket_name(&self) -> String {
        bucket_name_for(&self.extension)
    }
}

/// A single planned move.
///
/// `destination` is always `root / bucket_name / source.file_name()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOperation {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bucket_name: String,
}

/// Ordered list of planned moves, grouped by extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementPlan {
    pub operations: Vec<PlannedOperation>,
}

impl MovementPlan {
    /// Number of planned moves.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Operations in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, PlannedOperation> {
        self.operations.iter()
    }

    /// Bucket names in plan order, each listed once, with the number of
    /// operations targeting it.
    pub fn bucket_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for operation in &self.operations {
            let bucket = operation.bucket_name.as_str();
            match counts.last_mut() {
                Some((name, count)) if *name == bucket => *count += 1,
                _ => counts.push((bucket, 1)),
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a MovementPlan {
    type Item = &'a PlannedOperation;
    type IntoIter = std::slice::Iter<'a, PlannedOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

/// Lowercased extension of `path` with a leading dot, or an empty string.
///
/// Dotfiles such as `.gitignore` and names ending in a bare dot have no
/// extension.
pub fn normalize_extension(path: &Path) -> String {
    match path.extension() {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy().to_lowercase()),
        _ => String::new(),
    }
}

/// Bucket name for a normalized extension: the extension without its dot, or
/// [`NO_EXTENSION_BUCKET`].
pub fn bucket_name_for(extension: &str) -> String {
    match extension.strip_prefix('.') {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => NO_EXTENSION_BUCKET.to_string(),
    }
}

/// Builds the movement plan for `files`, rooted at `root`.
///
/// Files are stably sorted by normalized extension and grouped into runs; the
/// order within a run is the input order. `root` is not touched.
///
/// # Arguments
///
/// * `files` - Paths to organize, usually the output of a scan
/// * `root` - Directory the bucket directories are created under
pub fn generate_plan(files: Vec<PathBuf>, root: &Path) -> MovementPlan {
    let mut decorated: Vec<ScannedFile> = files.into_iter().map(ScannedFile::new).collect();
    decorated.sort_by(|a, b| a.extension.cmp(&b.extension));

    let mut operations = Vec::with_capacity(decorated.len());
    for run in decorated.chunk_by(|a, b| a.extension == b.extension) {
        let Some(first) = run.first() else {
            continue;
        };
        let bucket_name = first.bucket_name();
        let bucket_dir = root.join(&bucket_name);

        for file in run {
            let Some(file_name) = file.path.file_name() else {
                warn!(path = %file.path.display(), "path has no file name, leaving it out of the plan");
                continue;
            };
            operations.push(PlannedOperation {
                source: file.path.clone(),
                destination: bucket_dir.join(file_name),
                bucket_name: bucket_name.clone(),
            });
        }
    }

    debug!(operations = operations.len(), "plan generated");
    MovementPlan { operations }
}

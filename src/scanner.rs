//! Directory scanning.
//!
//! Walks one level of a directory and splits what it finds into regular files
//! and scan errors. Nothing is retried; the first listing error ends the walk.

use crate::safe_fs;
use std::fs::DirEntry;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A failure observed while listing a directory.
#[derive(Debug, thiserror::Error)]
#[error("Failed to scan {}: {source}", .path.display())]
pub struct ScanError {
    /// The directory being listed, or the entry whose type could not be read.
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// The files found by a scan, and the errors met along the way.
#[derive(Debug, Default)]
pub struct FileCollection {
    /// Regular files, in native directory order.
    pub files: Vec<PathBuf>,
    /// Errors, in the order they occurred.
    pub errors: Vec<ScanError>,
}

impl FileCollection {
    /// True when no regular file was collected.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Splits the collection into its files and its errors.
    pub fn into_parts(self) -> (Vec<PathBuf>, Vec<ScanError>) {
        (self.files, self.errors)
    }
}

/// Collects the regular files directly inside `target_directory`.
///
/// Symlinks, directories and special files are left out. If the listing fails
/// (on open or part-way through), the error is recorded and the files seen so
/// far are kept.
///
/// # Examples
///
/// ```no_run
/// use file_janitor::scanner::collect_files;
/// use std::path::Path;
///
/// let collection = collect_files(Path::new("/path/to/downloads"));
/// println!("{} files, {} errors", collection.files.len(), collection.errors.len());
/// ```
pub fn collect_files(target_directory: &Path) -> FileCollection {
    collect_from(target_directory, safe_fs::scan(target_directory))
}

/// What the scanner needs to know about one listed entry.
trait ListedEntry {
    fn path(&self) -> PathBuf;
    fn is_regular_file(&self) -> io::Result<bool>;
}

impl ListedEntry for DirEntry {
    fn path(&self) -> PathBuf {
        DirEntry::path(self)
    }

    fn is_regular_file(&self) -> io::Result<bool> {
        self.file_type().map(|file_type| file_type.is_file())
    }
}

fn collect_from<E, I>(target_directory: &Path, listing: I) -> FileCollection
where
    E: ListedEntry,
    I: IntoIterator<Item = io::Result<E>>,
{
    let mut collection = FileCollection::default();

    for result in listing {
        let entry = match result {
            Ok(entry) => entry,
            Err(source) => {
                warn!(path = %target_directory.display(), error = %source, "directory listing stopped");
                collection.errors.push(ScanError {
                    path: target_directory.to_path_buf(),
                    source,
                });
                break;
            }
        };

        match entry.is_regular_file() {
            Ok(true) => collection.files.push(entry.path()),
            Ok(false) => debug!(path = %entry.path().display(), "skipping non-regular entry"),
            Err(source) => {
                warn!(path = %entry.path().display(), error = %source, "could not read entry type");
                collection.errors.push(ScanError {
                    path: entry.path(),
                    source,
                });
            }
        }
    }

    debug!(
        files = collection.files.len(),
        errors = collection.errors.len(),
        "scan finished"
    );
    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collects_only_regular_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("a.txt"), "a").unwrap();
        fs::write(base_path.join("b"), "b").unwrap();
        fs::create_dir(base_path.join("folder")).unwrap();
        fs::write(base_path.join("folder").join("nested.txt"), "n").unwrap();

        let collection = collect_files(base_path);
        let mut names: Vec<_> = collection
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();

        assert_eq!(names, vec!["a.txt", "b"]);
        assert!(collection.errors.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_excluded() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let real = base_path.join("real.txt");
        fs::write(&real, "r").unwrap();
        std::os::unix::fs::symlink(&real, base_path.join("link.txt")).unwrap();

        let collection = collect_files(base_path);
        assert_eq!(collection.files, vec![real]);
    }

    #[test]
    fn test_missing_directory_reports_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("gone");

        let collection = collect_files(&missing);
        assert!(collection.is_empty());
        assert_eq!(collection.errors.len(), 1);
        assert_eq!(collection.errors[0].path, missing);
        assert_eq!(collection.errors[0].source.kind(), io::ErrorKind::NotFound);
    }

    struct FakeEntry {
        path: PathBuf,
        kind: Option<bool>,
    }

    impl FakeEntry {
        fn file(name: &str) -> io::Result<Self> {
            Ok(Self {
                path: PathBuf::from("/inbox").join(name),
                kind: Some(true),
            })
        }
    }

    impl ListedEntry for FakeEntry {
        fn path(&self) -> PathBuf {
            self.path.clone()
        }

        fn is_regular_file(&self) -> io::Result<bool> {
            self.kind
                .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "stat failed"))
        }
    }

    #[test]
    fn test_listing_error_keeps_earlier_files_and_stops() {
        let listing = safe_fs::ScanEntries::from_listing(
            vec![
                FakeEntry::file("a.txt"),
                Err(io::Error::other("read failed")),
                FakeEntry::file("b.txt"),
            ]
            .into_iter(),
        );

        let collection = collect_from(Path::new("/inbox"), listing);
        assert_eq!(collection.files, vec![PathBuf::from("/inbox/a.txt")]);
        assert_eq!(collection.errors.len(), 1);
        assert_eq!(collection.errors[0].path, PathBuf::from("/inbox"));
        assert_eq!(collection.errors[0].source.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn test_unreadable_entry_type_is_recorded_and_scan_continues() {
        let listing = vec![
            Ok(FakeEntry {
                path: PathBuf::from("/inbox/odd"),
                kind: None,
            }),
            Ok(FakeEntry {
                path: PathBuf::from("/inbox/dir"),
                kind: Some(false),
            }),
            FakeEntry::file("c.md"),
        ];

        let collection = collect_from(Path::new("/inbox"), listing);
        assert_eq!(collection.files, vec![PathBuf::from("/inbox/c.md")]);
        assert_eq!(collection.errors.len(), 1);
        assert_eq!(collection.errors[0].path, PathBuf::from("/inbox/odd"));
    }

    #[test]
    fn test_into_parts() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("x.md"), "x").unwrap();

        let (files, errors) = collect_files(temp_dir.path()).into_parts();
        assert_eq!(files.len(), 1);
        assert!(errors.is_empty());
    }
}

//! Non-panicking filesystem boundary.
//!
//! Every call in this module reports failure through an `io::Result` (or, for
//! [`exists`], through a plain `false`). The pipeline stages only touch the
//! filesystem through these four primitives.

use std::fs::{self, ReadDir};
use std::io;
use std::path::{Path, PathBuf};

/// Lazy, single-level directory listing.
///
/// Yields one `Ok(DirEntry)` per entry. The first error, whether it comes from
/// opening the directory or from advancing the listing, is yielded once and
/// ends the iteration.
#[derive(Debug)]
pub struct ScanEntries<I = ReadDir> {
    state: ScanState<I>,
}

#[derive(Debug)]
enum ScanState<I> {
    Opened(I),
    OpenFailed(io::Error),
    Done,
}

impl<I> ScanEntries<I> {
    /// Wraps an already opened listing.
    pub(crate) fn from_listing(entries: I) -> Self {
        Self {
            state: ScanState::Opened(entries),
        }
    }
}

impl<I, T> Iterator for ScanEntries<I>
where
    I: Iterator<Item = io::Result<T>>,
{
    type Item = io::Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.state, ScanState::Done) {
            ScanState::Opened(mut entries) => match entries.next() {
                Some(Ok(entry)) => {
                    self.state = ScanState::Opened(entries);
                    Some(Ok(entry))
                }
                Some(Err(e)) => Some(Err(e)),
                None => None,
            },
            ScanState::OpenFailed(e) => Some(Err(e)),
            ScanState::Done => None,
        }
    }
}

impl<I, T> std::iter::FusedIterator for ScanEntries<I> where I: Iterator<Item = io::Result<T>> {}

/// Starts a lazy listing of `path`. Nothing is read until the iterator is polled
/// past the open step.
pub fn scan(path: &Path) -> ScanEntries {
    match fs::read_dir(path) {
        Ok(entries) => ScanEntries::from_listing(entries),
        Err(e) => ScanEntries {
            state: ScanState::OpenFailed(e),
        },
    }
}

/// Returns whether anything occupies `path`.
///
/// Symlinks are not followed, so a dangling link still counts as present.
/// A failed metadata query is reported as `false`.
pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Moves `from` to `to`, refusing to replace an existing destination.
///
/// # Errors
///
/// Returns `io::ErrorKind::AlreadyExists` if `to` is occupied, otherwise
/// whatever the OS rename reports.
pub fn rename(from: &Path, to: &Path) -> io::Result<()> {
    if exists(to) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("destination already exists: {}", to.display()),
        ));
    }
    fs::rename(from, to)
}

/// Creates `path` and any missing parents. An existing directory is success.
pub fn create_directories(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Parent of `path`, or an empty path for a bare name.
pub(crate) fn parent_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

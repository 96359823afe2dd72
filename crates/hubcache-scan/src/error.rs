use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Fatal, top-level scan failures.
///
/// Only the cache root being missing or unusable aborts a scan. Everything
/// repo- or file-scoped is downgraded and returned as data in the report
/// (see [`crate::ScanIssue`]) so one corrupted repo never hides the rest of
/// the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache directory not found: {0}")]
    NotFound(PathBuf),

    #[error("cache path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to read cache directory {path}: {source}")]
    Unreadable { path: PathBuf, source: io::Error },
}

/// Repo-scoped scan failures.
///
/// One of these aborts the scan of a single repo cache folder; sibling
/// repos are unaffected. The assembler converts them into error-severity
/// [`crate::ScanIssue`] entries.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("blobs directory missing or not a directory: {0}")]
    MissingBlobs(PathBuf),

    #[error("snapshots directory missing: {0}")]
    MissingSnapshots(PathBuf),

    #[error("expected a directory, found a file: {0}")]
    NotADirectory(PathBuf),

    #[error("symlinks are not supported on this filesystem: {path}: {reason}")]
    SymlinksUnsupported { path: PathBuf, reason: String },

    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

impl RepoError {
    /// The offending path, for issue reporting.
    pub fn path(&self) -> &Path {
        match self {
            RepoError::MissingBlobs(p)
            | RepoError::MissingSnapshots(p)
            | RepoError::NotADirectory(p) => p,
            RepoError::SymlinksUnsupported { path, .. } | RepoError::Io { path, .. } => path,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        RepoError::Io {
            path: path.into(),
            source,
        }
    }
}

//! Data model for the scan report.
//!
//! Everything here is built once per scan and never mutated afterwards.
//! All types serialize with serde so callers can render the report as
//! JSON or feed it to an external deletion executor.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::RepoError;
use crate::layout::RepoType;

/// How bad a scan issue is.
///
/// `Error` means a whole repo folder was skipped; `Warning` means a single
/// file, ref or blob was degraded but the surrounding repo still scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One problem found during a scan, tied to the offending path.
///
/// Issues are collected, never raised: the report always covers every repo
/// that could be scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanIssue {
    pub severity: Severity,
    pub path: PathBuf,
    pub message: String,
}

impl ScanIssue {
    pub(crate) fn warning(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ScanIssue {
            severity: Severity::Warning,
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn from_repo_error(err: &RepoError) -> Self {
        ScanIssue {
            severity: Severity::Error,
            path: err.path().to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// A single content-addressed blob file in a repo's `blobs/` directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobInfo {
    /// Content hash, taken from the blob's file name.
    pub id: String,
    pub path: PathBuf,
    pub size_on_disk: u64,
    /// Unix seconds.
    pub last_modified: u64,
    /// Unix seconds.
    pub last_accessed: u64,
}

/// One file inside a revision snapshot.
///
/// The file is a symlink; `blob_path` is its resolved target and
/// `size_on_disk` the size of that blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub file_name: String,
    pub file_path: PathBuf,
    pub blob_path: PathBuf,
    pub size_on_disk: u64,
}

impl FileInfo {
    pub fn size_on_disk_str(&self) -> String {
        format_size(self.size_on_disk)
    }
}

/// One revision snapshot of a cached repo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionInfo {
    pub commit_hash: String,
    pub snapshot_path: PathBuf,
    /// Files in the snapshot, ordered by path.
    pub files: Vec<FileInfo>,
    /// Refs currently pointing at this revision. Empty means detached.
    pub refs: Vec<String>,
    /// Sum of the sizes of the distinct blobs this revision references.
    /// Two files sharing a blob count it once.
    pub size_on_disk: u64,
    /// Latest mtime among the revision's files, unix seconds.
    pub last_modified: u64,
}

impl RevisionInfo {
    pub fn nb_files(&self) -> u64 {
        self.files.len() as u64
    }

    /// A detached (orphaned) revision has no ref pointing at it and is the
    /// usual candidate for deletion.
    pub fn is_detached(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn size_on_disk_str(&self) -> String {
        format_size(self.size_on_disk)
    }
}

/// Everything known about one cached repo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoInfo {
    pub repo_id: String,
    pub repo_type: RepoType,
    pub repo_path: PathBuf,
    /// Revisions ordered by commit hash.
    pub revisions: Vec<RevisionInfo>,
    /// Contents of `blobs/`, ordered by blob id.
    pub blobs: Vec<BlobInfo>,
    /// Sum of the sizes of all distinct blobs in `blobs/`. A blob shared
    /// by several revisions counts once.
    pub size_on_disk: u64,
    /// Latest revision mtime, unix seconds.
    pub last_modified: u64,
    /// Latest blob atime, unix seconds.
    pub last_accessed: u64,
}

impl RepoInfo {
    pub fn nb_blobs(&self) -> u64 {
        self.blobs.len() as u64
    }

    pub fn size_on_disk_str(&self) -> String {
        format_size(self.size_on_disk)
    }

    /// Ref name to revision map, derived from the revisions' ref sets.
    pub fn refs(&self) -> BTreeMap<&str, &RevisionInfo> {
        let mut refs = BTreeMap::new();
        for revision in &self.revisions {
            for name in &revision.refs {
                refs.insert(name.as_str(), revision);
            }
        }
        refs
    }

    pub fn revision(&self, commit_hash: &str) -> Option<&RevisionInfo> {
        self.revisions.iter().find(|r| r.commit_hash == commit_hash)
    }

    /// Blobs present in `blobs/` that no revision references, typically
    /// left behind by an interrupted download.
    pub fn unreferenced_blobs(&self) -> Vec<&BlobInfo> {
        let referenced: std::collections::BTreeSet<&std::path::Path> = self
            .revisions
            .iter()
            .flat_map(|r| r.files.iter().map(|f| f.blob_path.as_path()))
            .collect();
        self.blobs
            .iter()
            .filter(|b| !referenced.contains(b.path.as_path()))
            .collect()
    }
}

/// The immutable result of one cache scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheReport {
    /// Scanned repos, ordered by cache folder path.
    pub repos: Vec<RepoInfo>,
    /// Everything that went wrong, ordered by path then message.
    pub issues: Vec<ScanIssue>,
    /// Sum of all repo sizes (distinct blobs only).
    pub size_on_disk: u64,
    /// Total number of distinct blob files across the cache.
    pub nb_blobs: u64,
}

impl CacheReport {
    pub fn size_on_disk_str(&self) -> String {
        format_size(self.size_on_disk)
    }
}

/// Format a byte count as a short human-readable string, e.g. `36.0M`.
/// Decimal units (1K = 1000 bytes).
pub fn format_size(num: u64) -> String {
    let mut n = num as f64;
    for unit in ["", "K", "M", "G", "T", "P", "E", "Z"] {
        if n < 1000.0 {
            return format!("{n:.1}{unit}");
        }
        n /= 1000.0;
    }
    format!("{n:.1}Y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_uses_decimal_units() {
        assert_eq!(format_size(0), "0.0");
        assert_eq!(format_size(100), "100.0");
        assert_eq!(format_size(999), "999.0");
        assert_eq!(format_size(1500), "1.5K");
        assert_eq!(format_size(36_000_000), "36.0M");
        assert_eq!(format_size(2_500_000_000), "2.5G");
    }
}

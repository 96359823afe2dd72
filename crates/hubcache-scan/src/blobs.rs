//! Blob scanner: flat walk of a repo's `blobs/` directory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::error::RepoError;
use crate::report::ScanIssue;

/// One blob as seen on disk. Sizes follow symlinks: a blob that is itself
/// a link is sized by its target.
#[derive(Debug, Clone)]
pub(crate) struct BlobEntry {
    pub path: PathBuf,
    pub size: u64,
    pub mtime: u64,
    pub atime: u64,
}

pub(crate) fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// (mtime, atime) in unix seconds.
pub(crate) fn metadata_times(md: &fs::Metadata) -> (u64, u64) {
    let mtime = md.modified().map(unix_secs).unwrap_or(0);
    let atime = md.accessed().map(unix_secs).unwrap_or(0);
    (mtime, atime)
}

/// Scan `blobs/` and return blob id (file name) to entry, plus any
/// entry-scoped issues. Blob storage is flat: subdirectories are not
/// expected and are reported, not descended into.
pub(crate) fn scan_blobs(
    blobs_dir: &Path,
) -> Result<(HashMap<String, BlobEntry>, Vec<ScanIssue>), RepoError> {
    if !blobs_dir.is_dir() {
        return Err(RepoError::MissingBlobs(blobs_dir.to_path_buf()));
    }

    let mut blobs = HashMap::new();
    let mut issues = Vec::new();
    let entries = fs::read_dir(blobs_dir).map_err(|e| RepoError::io(blobs_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| RepoError::io(blobs_dir, e))?;
        let path = entry.path();
        // Follows symlinks, so sizes come from the real file.
        let md = match fs::metadata(&path) {
            Ok(md) => md,
            Err(e) => {
                issues.push(ScanIssue::warning(&path, format!("unreadable blob: {e}")));
                continue;
            }
        };
        if md.is_dir() {
            issues.push(ScanIssue::warning(&path, "unexpected directory in blobs"));
            continue;
        }
        let id = entry.file_name().to_string_lossy().into_owned();
        let (mtime, atime) = metadata_times(&md);
        blobs.insert(
            id,
            BlobEntry {
                path,
                size: md.len(),
                mtime,
                atime,
            },
        );
    }
    debug!(blobs = blobs.len(), "scanned blob directory {:?}", blobs_dir);
    Ok((blobs, issues))
}

/// Preflight probe: create and remove a symlink inside the repo folder.
///
/// Some filesystems (and Windows without developer mode) refuse symlinks
/// entirely; a snapshot cache cannot exist there and the repo is skipped
/// with a hard, repo-scoped error.
pub(crate) fn check_symlink_support(dir: &Path) -> Result<(), RepoError> {
    let pid = std::process::id();
    let target = dir.join(format!(".probe-target-{pid}"));
    let link = dir.join(format!(".probe-link-{pid}"));

    fs::write(&target, b"").map_err(|e| RepoError::io(dir, e))?;
    let res = make_symlink(&target, &link);
    let _ = fs::remove_file(&link);
    let _ = fs::remove_file(&target);

    res.map_err(|e| RepoError::SymlinksUnsupported {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn make_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "no symlink primitive on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scans_flat_blob_directory() {
        let dir = TempDir::new().unwrap();
        let blobs_dir = dir.path().join("blobs");
        fs::create_dir(&blobs_dir).unwrap();
        fs::write(blobs_dir.join("aaaa"), vec![0u8; 100]).unwrap();
        fs::write(blobs_dir.join("bbbb"), vec![0u8; 8]).unwrap();
        fs::create_dir(blobs_dir.join("nested")).unwrap();

        let (blobs, issues) = scan_blobs(&blobs_dir).unwrap();
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs["aaaa"].size, 100);
        assert_eq!(blobs["bbbb"].size, 8);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("unexpected directory"));
    }

    #[test]
    fn missing_blob_dir_is_a_repo_error() {
        let dir = TempDir::new().unwrap();
        let err = scan_blobs(&dir.path().join("blobs")).unwrap_err();
        assert!(matches!(err, RepoError::MissingBlobs(_)));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_probe_passes_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        check_symlink_support(dir.path()).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

//! Repo aggregator: combines the blob scan and revision walk for one repo
//! cache folder into a [`RepoInfo`], with per-item issue isolation.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::blobs::{check_symlink_support, metadata_times, scan_blobs};
use crate::error::RepoError;
use crate::layout::RepoFolderName;
use crate::report::{BlobInfo, RepoInfo, ScanIssue};
use crate::snapshots::{read_refs, scan_snapshots};

/// Scan one repo cache folder.
///
/// Returns the repo summary together with any file-scoped warnings, or a
/// single repo-scoped error if the folder's structure is unusable. Either
/// way sibling repos are unaffected.
pub(crate) fn scan_repo(
    repo_path: &Path,
    name: &RepoFolderName,
) -> Result<(RepoInfo, Vec<ScanIssue>), RepoError> {
    // Canonical from here on, so resolved symlink targets compare equal.
    let repo_path = fs::canonicalize(repo_path).map_err(|e| RepoError::io(repo_path, e))?;
    check_symlink_support(&repo_path)?;

    let blobs_dir = repo_path.join("blobs");
    let snapshots_dir = repo_path.join("snapshots");
    if !snapshots_dir.is_dir() {
        return Err(RepoError::MissingSnapshots(snapshots_dir));
    }

    let (blob_map, mut issues) = scan_blobs(&blobs_dir)?;
    let (mut refs_by_hash, ref_issues) = read_refs(&repo_path.join("refs"))?;
    issues.extend(ref_issues);
    let (revisions, snapshot_issues) =
        scan_snapshots(&snapshots_dir, &blobs_dir, &blob_map, &mut refs_by_hash)?;
    issues.extend(snapshot_issues);

    // Refs no revision claimed are dangling: report, keep the repo.
    let dangling: BTreeMap<_, _> = refs_by_hash.drain().collect();
    for (commit_hash, ref_names) in dangling {
        for ref_name in ref_names {
            issues.push(ScanIssue::warning(
                repo_path.join("refs").join(&ref_name),
                format!("ref {ref_name} points to missing revision {commit_hash}"),
            ));
        }
    }

    let mut blobs: Vec<BlobInfo> = blob_map
        .into_iter()
        .map(|(id, entry)| BlobInfo {
            id,
            path: entry.path,
            size_on_disk: entry.size,
            last_modified: entry.mtime,
            last_accessed: entry.atime,
        })
        .collect();
    blobs.sort_by(|a, b| a.id.cmp(&b.id));

    let (dir_mtime, dir_atime) = fs::metadata(&repo_path)
        .map(|md| metadata_times(&md))
        .unwrap_or((0, 0));
    let last_modified = revisions
        .iter()
        .map(|r| r.last_modified)
        .max()
        .unwrap_or(dir_mtime);
    let last_accessed = blobs
        .iter()
        .map(|b| b.last_accessed)
        .max()
        .unwrap_or(dir_atime);

    let repo = RepoInfo {
        repo_id: name.repo_id.clone(),
        repo_type: name.repo_type,
        size_on_disk: blobs.iter().map(|b| b.size_on_disk).sum(),
        repo_path,
        revisions,
        blobs,
        last_modified,
        last_accessed,
    };
    debug!(
        repo_id = %repo.repo_id,
        revisions = repo.revisions.len(),
        blobs = repo.blobs.len(),
        size = repo.size_on_disk,
        "scanned repo"
    );
    Ok((repo, issues))
}

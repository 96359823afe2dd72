//! Snapshot/revision walker: rebuilds each revision's file tree from its
//! symlinks and maps refs to revision hashes.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::blobs::BlobEntry;
use crate::error::RepoError;
use crate::report::{FileInfo, RevisionInfo, ScanIssue};

/// Read `refs/` into a revision-hash to ref-names map.
///
/// Ref names may be nested (`refs/pr/1`), so the walk is recursive and the
/// name is the path relative to `refs/`. A missing `refs/` directory is
/// normal (nothing downloaded through a named ref yet).
pub(crate) fn read_refs(
    refs_dir: &Path,
) -> Result<(HashMap<String, BTreeSet<String>>, Vec<ScanIssue>), RepoError> {
    let mut by_hash: HashMap<String, BTreeSet<String>> = HashMap::new();
    let mut issues = Vec::new();

    if !refs_dir.exists() {
        return Ok((by_hash, issues));
    }
    if refs_dir.is_file() {
        return Err(RepoError::NotADirectory(refs_dir.to_path_buf()));
    }

    for entry in WalkDir::new(refs_dir).min_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                issues.push(ScanIssue::warning(refs_dir, format!("unreadable ref: {e}")));
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        let name = entry
            .path()
            .strip_prefix(refs_dir)
            .unwrap_or_else(|_| entry.path())
            .to_string_lossy()
            .into_owned();
        match fs::read_to_string(entry.path()) {
            Ok(contents) => {
                let commit_hash = contents.trim();
                if commit_hash.is_empty() {
                    issues.push(ScanIssue::warning(entry.path(), "empty ref file"));
                    continue;
                }
                by_hash.entry(commit_hash.to_owned()).or_default().insert(name);
            }
            Err(e) => {
                issues.push(ScanIssue::warning(
                    entry.path(),
                    format!("unreadable ref file: {e}"),
                ));
            }
        }
    }
    Ok((by_hash, issues))
}

/// Walk `snapshots/`, one revision per immediate subdirectory.
///
/// `refs_by_hash` is drained as revisions claim their refs; whatever is
/// left afterwards is dangling and reported by the caller. `blobs_dir`
/// must be canonical so resolved symlink targets compare against it.
pub(crate) fn scan_snapshots(
    snapshots_dir: &Path,
    blobs_dir: &Path,
    blobs: &HashMap<String, BlobEntry>,
    refs_by_hash: &mut HashMap<String, BTreeSet<String>>,
) -> Result<(Vec<RevisionInfo>, Vec<ScanIssue>), RepoError> {
    let mut revisions = Vec::new();
    let mut issues = Vec::new();

    let entries = fs::read_dir(snapshots_dir).map_err(|e| RepoError::io(snapshots_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| RepoError::io(snapshots_dir, e))?;
        let path = entry.path();
        if !path.is_dir() {
            issues.push(ScanIssue::warning(&path, "unexpected file in snapshots"));
            continue;
        }
        let commit_hash = entry.file_name().to_string_lossy().into_owned();
        let refs = refs_by_hash.remove(&commit_hash).unwrap_or_default();
        let revision = scan_revision(&path, commit_hash, refs, blobs_dir, blobs, &mut issues);
        revisions.push(revision);
    }

    revisions.sort_by(|a, b| a.commit_hash.cmp(&b.commit_hash));
    debug!(
        revisions = revisions.len(),
        "walked snapshots under {:?}", snapshots_dir
    );
    Ok((revisions, issues))
}

fn scan_revision(
    snapshot_path: &Path,
    commit_hash: String,
    refs: BTreeSet<String>,
    blobs_dir: &Path,
    blobs: &HashMap<String, BlobEntry>,
    issues: &mut Vec<ScanIssue>,
) -> RevisionInfo {
    let mut files = Vec::new();
    // Distinct blob identity -> size; files sharing a blob count it once.
    let mut distinct = BTreeMap::new();
    let mut last_modified = 0u64;

    for entry in WalkDir::new(snapshot_path).min_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                issues.push(ScanIssue::warning(
                    snapshot_path,
                    format!("unreadable snapshot entry: {e}"),
                ));
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        let file_path = entry.path().to_path_buf();

        let (blob_path, size) = match fs::canonicalize(&file_path) {
            Ok(target) => {
                let id = target
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let size = if target.starts_with(blobs_dir) {
                    match blobs.get(&id) {
                        Some(blob) => blob.size,
                        None => {
                            // Blob appeared after the blobs/ listing, or the
                            // listing raced an external writer. Stat directly.
                            issues.push(ScanIssue::warning(
                                &file_path,
                                format!("blob {id} not present in blobs directory listing"),
                            ));
                            fs::metadata(&target).map(|md| md.len()).unwrap_or(0)
                        }
                    }
                } else {
                    issues.push(ScanIssue::warning(
                        &file_path,
                        format!("file does not point into blobs directory: {}", target.display()),
                    ));
                    fs::metadata(&target).map(|md| md.len()).unwrap_or(0)
                };
                (target, size)
            }
            Err(e) => {
                issues.push(ScanIssue::warning(
                    &file_path,
                    format!("blob missing (broken symlink): {e}"),
                ));
                let target = fs::read_link(&file_path).unwrap_or_else(|_| file_path.clone());
                (target, 0)
            }
        };

        let mtime = fs::metadata(&file_path)
            .or_else(|_| fs::symlink_metadata(&file_path))
            .ok()
            .and_then(|md| md.modified().ok())
            .map(crate::blobs::unix_secs)
            .unwrap_or(0);
        last_modified = last_modified.max(mtime);

        distinct.insert(blob_path.clone(), size);
        files.push(FileInfo {
            file_name: entry.file_name().to_string_lossy().into_owned(),
            file_path,
            blob_path,
            size_on_disk: size,
        });
    }

    if files.is_empty() {
        // Empty snapshot: fall back to the directory's own mtime.
        last_modified = fs::metadata(snapshot_path)
            .ok()
            .and_then(|md| md.modified().ok())
            .map(crate::blobs::unix_secs)
            .unwrap_or(0);
    }

    files.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    RevisionInfo {
        commit_hash,
        snapshot_path: snapshot_path.to_path_buf(),
        size_on_disk: distinct.values().sum(),
        files,
        refs: refs.into_iter().collect(),
        last_modified,
    }
}

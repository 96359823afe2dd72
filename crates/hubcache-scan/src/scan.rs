//! Cache info assembler: orchestrates classification and the per-repo
//! scans, then merges everything into one deterministic report.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::layout::{default_cache_dir, RepoFolderName};
use crate::repo::scan_repo;
use crate::report::{CacheReport, RepoInfo, ScanIssue};

/// Scan a cache directory and return a full inventory report.
///
/// `cache_dir` defaults to [`default_cache_dir`]. Only a missing or
/// unusable root is an `Err`; every repo- or file-scoped problem is
/// collected into [`CacheReport::issues`]. Per-repo scans are independent
/// read-only walks and run on the rayon pool; the report is sorted after
/// collection so its contents never depend on scheduling.
pub fn scan_cache_dir(cache_dir: Option<&Path>) -> Result<CacheReport, CacheError> {
    let root = match cache_dir {
        Some(p) => p.to_path_buf(),
        None => default_cache_dir(),
    };
    if !root.exists() {
        return Err(CacheError::NotFound(root));
    }
    let root = fs::canonicalize(&root).map_err(|source| CacheError::Unreadable {
        path: root.clone(),
        source,
    })?;
    if !root.is_dir() {
        return Err(CacheError::NotADirectory(root));
    }
    debug!("scanning cache directory {:?}", root);

    let mut children = Vec::new();
    let entries = fs::read_dir(&root).map_err(|source| CacheError::Unreadable {
        path: root.clone(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| CacheError::Unreadable {
            path: root.clone(),
            source,
        })?;
        children.push(entry.path());
    }
    children.sort();

    let mut issues = Vec::new();
    let mut repo_dirs: Vec<(PathBuf, RepoFolderName)> = Vec::new();
    for path in children {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !path.is_dir() {
            issues.push(ScanIssue::warning(path, "unexpected file in cache directory"));
            continue;
        }
        match RepoFolderName::parse(&file_name) {
            Some(name) => repo_dirs.push((path, name)),
            None => issues.push(ScanIssue::warning(
                path,
                "unexpected directory, not a <type>s--<name> repo cache folder",
            )),
        }
    }

    let scanned: Vec<_> = repo_dirs
        .par_iter()
        .map(|(path, name)| scan_repo(path, name))
        .collect();

    let mut repos: Vec<RepoInfo> = Vec::new();
    for result in scanned {
        match result {
            Ok((repo, repo_issues)) => {
                repos.push(repo);
                issues.extend(repo_issues);
            }
            Err(err) => issues.push(ScanIssue::from_repo_error(&err)),
        }
    }

    repos.sort_by(|a, b| a.repo_path.cmp(&b.repo_path));
    issues.sort_by(|a, b| (&a.path, &a.message).cmp(&(&b.path, &b.message)));

    if !issues.is_empty() {
        warn!(issues = issues.len(), "cache scan collected issues");
    }

    Ok(CacheReport {
        size_on_disk: repos.iter().map(|r| r.size_on_disk).sum(),
        nb_blobs: repos.iter().map(|r| r.nb_blobs()).sum(),
        repos,
        issues,
    })
}

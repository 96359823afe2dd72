//! Deletion planning: computes what removing a set of revisions would
//! free, without touching the filesystem.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::report::{format_size, CacheReport};

/// Resolution of one requested revision hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionStatus {
    pub revision: String,
    pub found: bool,
}

/// An unexecuted deletion plan.
///
/// Lists exactly what an external executor would have to remove: whole
/// repo folders (every revision of the repo was requested), individual
/// snapshot directories, ref files naming deleted revisions, and the blobs
/// no surviving revision references. Building the strategy performs no
/// filesystem mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionStrategy {
    /// One entry per distinct requested hash, in sorted order.
    pub requested: Vec<RevisionStatus>,
    pub repos: BTreeSet<PathBuf>,
    pub snapshots: BTreeSet<PathBuf>,
    pub refs: BTreeSet<PathBuf>,
    pub blobs: BTreeSet<PathBuf>,
    pub expected_freed_size: u64,
    pub warnings: Vec<String>,
}

impl DeletionStrategy {
    pub fn expected_freed_size_str(&self) -> String {
        format_size(self.expected_freed_size)
    }
}

impl CacheReport {
    /// Plan the deletion of a set of revisions.
    ///
    /// Unknown hashes are reported as unresolved, not errors. A revision
    /// still pointed at by a ref is included anyway (the caller asked for
    /// it) with a warning; its ref files join the removal set. Blobs shared
    /// with a surviving revision are kept and do not count toward the
    /// freed size.
    pub fn plan_deletion<I, S>(&self, revisions: I) -> DeletionStrategy
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: BTreeSet<String> = revisions
            .into_iter()
            .map(|s| s.as_ref().to_owned())
            .collect();
        let mut found: BTreeSet<&str> = BTreeSet::new();
        let mut strategy = DeletionStrategy::default();

        for repo in &self.repos {
            let (selected, kept): (Vec<_>, Vec<_>) = repo
                .revisions
                .iter()
                .partition(|r| requested.contains(&r.commit_hash));
            if selected.is_empty() {
                continue;
            }
            for revision in &selected {
                found.insert(revision.commit_hash.as_str());
                for ref_name in &revision.refs {
                    strategy.warnings.push(format!(
                        "revision {} of {} is still referenced by ref {}",
                        revision.commit_hash, repo.repo_id, ref_name
                    ));
                }
            }

            if kept.is_empty() {
                // Nothing survives: remove the repo folder wholesale. This
                // also reclaims blobs no revision referenced.
                strategy.repos.insert(repo.repo_path.clone());
                strategy.expected_freed_size += repo.size_on_disk;
                continue;
            }

            let keep: BTreeSet<&Path> = kept
                .iter()
                .flat_map(|r| r.files.iter().map(|f| f.blob_path.as_path()))
                .collect();
            let mut candidates: BTreeMap<&Path, u64> = BTreeMap::new();
            for revision in &selected {
                strategy.snapshots.insert(revision.snapshot_path.clone());
                for ref_name in &revision.refs {
                    strategy
                        .refs
                        .insert(repo.repo_path.join("refs").join(ref_name));
                }
                for file in &revision.files {
                    candidates.insert(file.blob_path.as_path(), file.size_on_disk);
                }
            }
            for (blob_path, size) in candidates {
                if !keep.contains(blob_path) {
                    strategy.blobs.insert(blob_path.to_path_buf());
                    strategy.expected_freed_size += size;
                }
            }
        }

        for hash in &requested {
            let ok = found.contains(hash.as_str());
            if !ok {
                strategy.warnings.push(format!("revision not found: {hash}"));
            }
            strategy.requested.push(RevisionStatus {
                revision: hash.clone(),
                found: ok,
            });
        }
        strategy
    }
}

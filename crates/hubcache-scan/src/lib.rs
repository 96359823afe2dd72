//! # hubcache-scan
//!
//! Cache scanning and inventory engine for hub snapshot caches.
//!
//! A cache root stores content-addressed blobs plus symlinked revision
//! snapshots, one folder per repo. [`scan_cache_dir`] walks that layout
//! and rebuilds a consistent logical view: which repos and revisions are
//! cached, how much space each consumes counting every blob exactly once,
//! and which refs point where. Corruption is isolated per item and
//! returned as data ([`ScanIssue`]), never raised mid-scan.
//!
//! ## Directory layout
//!
//! ```text
//! <root>/
//! └── models--org--name/
//!     ├── blobs/
//!     │   └── <hash>                    # one file per content hash
//!     ├── snapshots/
//!     │   └── <revision>/
//!     │       └── config.json           # symlink into blobs/
//!     └── refs/
//!         └── main                      # text file holding a revision hash
//! ```
//!
//! ## Example
//!
//! ```no_run
//! let report = hubcache_scan::scan_cache_dir(None)?;
//! for repo in &report.repos {
//!     println!("{} {} {}", repo.repo_id, repo.repo_type, repo.size_on_disk_str());
//! }
//! let strategy = report.plan_deletion(["deadbeef"]);
//! println!("would free {}", strategy.expected_freed_size_str());
//! # Ok::<(), hubcache_scan::CacheError>(())
//! ```
//!
//! The scanner never mutates the cache. Deletion is planned with
//! [`CacheReport::plan_deletion`] and executed by an external collaborator.

mod blobs;
mod delete;
mod error;
mod layout;
mod repo;
mod report;
mod scan;
mod snapshots;

pub use delete::{DeletionStrategy, RevisionStatus};
pub use error::{CacheError, RepoError};
pub use layout::{default_cache_dir, RepoFolderName, RepoType, CACHE_DIR_ENV};
pub use report::{
    format_size, BlobInfo, CacheReport, FileInfo, RepoInfo, RevisionInfo, ScanIssue, Severity,
};
pub use scan::scan_cache_dir;

//! Cache directory layout: repo folder name grammar and default location.
//!
//! A cache root contains one folder per cached repo, named
//! `<type>s--<namespace>--<name>` (the `--` separator replaces `/` in the
//! repo id). Each repo folder holds `blobs/`, `snapshots/` and `refs/`.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Environment variable overriding the default cache location.
pub const CACHE_DIR_ENV: &str = "HUBCACHE_DIR";

/// The kind of hub repository a cache folder belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    Model,
    Dataset,
    Space,
}

impl RepoType {
    pub fn as_str(self) -> &'static str {
        match self {
            RepoType::Model => "model",
            RepoType::Dataset => "dataset",
            RepoType::Space => "space",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "model" => Some(RepoType::Model),
            "dataset" => Some(RepoType::Dataset),
            "space" => Some(RepoType::Space),
            _ => None,
        }
    }
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed repo cache folder name.
///
/// `models--google--fleurs` parses to `(Model, "google/fleurs")`;
/// `datasets--squad` parses to `(Dataset, "squad")`. Anything else is not
/// a repo folder and is reported as unexpected by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFolderName {
    pub repo_type: RepoType,
    pub repo_id: String,
}

impl RepoFolderName {
    pub fn parse(name: &str) -> Option<Self> {
        let (prefix, rest) = name.split_once("--")?;
        let tag = prefix.strip_suffix('s')?;
        let repo_type = RepoType::from_tag(tag)?;
        if rest.is_empty() {
            return None;
        }
        Some(RepoFolderName {
            repo_type,
            repo_id: rest.replace("--", "/"),
        })
    }
}

/// Default cache root: `$HUBCACHE_DIR` if set, else the platform cache
/// directory (`~/.cache/hubcache/hub` on Linux).
pub fn default_cache_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("hubcache")
        .join("hub")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_model() {
        let parsed = RepoFolderName::parse("models--google--fleurs").unwrap();
        assert_eq!(parsed.repo_type, RepoType::Model);
        assert_eq!(parsed.repo_id, "google/fleurs");
    }

    #[test]
    fn parses_unnamespaced_dataset() {
        let parsed = RepoFolderName::parse("datasets--squad").unwrap();
        assert_eq!(parsed.repo_type, RepoType::Dataset);
        assert_eq!(parsed.repo_id, "squad");
    }

    #[test]
    fn extra_separators_become_slashes() {
        let parsed = RepoFolderName::parse("spaces--org--app--demo").unwrap();
        assert_eq!(parsed.repo_type, RepoType::Space);
        assert_eq!(parsed.repo_id, "org/app/demo");
    }

    #[test]
    fn rejects_non_repo_names() {
        assert!(RepoFolderName::parse("stray-folder").is_none());
        assert!(RepoFolderName::parse("models").is_none());
        assert!(RepoFolderName::parse("models--").is_none());
        assert!(RepoFolderName::parse("model--x").is_none());
        assert!(RepoFolderName::parse("widgets--x").is_none());
        assert!(RepoFolderName::parse("s--x").is_none());
    }
}

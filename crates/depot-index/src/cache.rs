//! Per-source parse-result cache.
//!
//! Entries are keyed by a digest of the locator plus a digest of the
//! canonical options JSON — the per-source filter predicate is not part of
//! the options struct and so never reaches the key. Writes go through a
//! temp-file-then-rename so a reader can never see a truncated entry;
//! anything that fails to parse on read degrades to a miss.

use std::path::{Path, PathBuf};

use depot_core::ContentDigest;
use depot_manifest::PackageSet;

use crate::error::{IndexError, Result};
use crate::source::Source;

/// A filesystem cache of per-source parser output.
#[derive(Debug, Clone)]
pub struct ParseCache {
    root: PathBuf,
}

impl ParseCache {
    /// Create a cache rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ParseCache { root: root.into() }
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache key for a source: locator digest, options digest.
    fn key(source: &Source) -> String {
        format!(
            "{}-{}",
            ContentDigest::of_bytes(source.locator.as_bytes()),
            ContentDigest::of_value(&source.options)
        )
    }

    fn entry_path(&self, source: &Source) -> PathBuf {
        self.root.join(format!("{}.json", Self::key(source)))
    }

    /// Look up the cached parse result for a source.
    ///
    /// Any failure — missing file, unreadable file, corrupt content — is a
    /// miss, never an error.
    pub fn get(&self, source: &Source) -> Option<PackageSet> {
        let path = self.entry_path(source);
        let data = std::fs::read(&path).ok()?;
        match serde_json::from_slice(&data) {
            Ok(set) => Some(set),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "corrupt cache entry; regenerating");
                None
            }
        }
    }

    /// Store a parse result for a source.
    pub fn put(&self, source: &Source, set: &PackageSet) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| IndexError::Cache {
            path: self.root.clone(),
            detail: format!("creating cache dir: {e}"),
        })?;
        let path = self.entry_path(source);
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_vec(set)?;
        std::fs::write(&tmp, data).map_err(|e| IndexError::Cache {
            path: tmp.clone(),
            detail: format!("writing entry: {e}"),
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| IndexError::Cache {
            path,
            detail: format!("publishing entry: {e}"),
        })?;
        Ok(())
    }

    /// Invalidate cache entries.
    ///
    /// With no locator the whole cache directory is removed and recreated;
    /// with a locator only entries whose name starts with that locator's
    /// digest go (one entry may exist per distinct option set). Returns
    /// whether anything was removed.
    pub fn invalidate(&self, locator: Option<&str>) -> Result<bool> {
        match locator {
            None => {
                let existed = self.root.is_dir();
                if existed {
                    std::fs::remove_dir_all(&self.root).map_err(|e| IndexError::Cache {
                        path: self.root.clone(),
                        detail: format!("removing cache dir: {e}"),
                    })?;
                }
                std::fs::create_dir_all(&self.root).map_err(|e| IndexError::Cache {
                    path: self.root.clone(),
                    detail: format!("recreating cache dir: {e}"),
                })?;
                Ok(existed)
            }
            Some(locator) => {
                if !self.root.is_dir() {
                    return Ok(false);
                }
                let prefix = ContentDigest::of_bytes(locator.as_bytes())
                    .as_str()
                    .to_string();
                let mut removed = false;
                for entry in std::fs::read_dir(&self.root).map_err(|e| IndexError::Cache {
                    path: self.root.clone(),
                    detail: format!("listing cache dir: {e}"),
                })? {
                    let entry = entry.map_err(|e| IndexError::Cache {
                        path: self.root.clone(),
                        detail: format!("reading entry: {e}"),
                    })?;
                    let name = entry.file_name();
                    let matches = name
                        .to_str()
                        .map(|n| n.starts_with(&prefix))
                        .unwrap_or(false);
                    if matches {
                        std::fs::remove_file(entry.path()).map_err(|e| IndexError::Cache {
                            path: entry.path(),
                            detail: format!("removing entry: {e}"),
                        })?;
                        removed = true;
                    }
                }
                Ok(removed)
            }
        }
    }
}

//! Process-private workspace for remote checkouts.
//!
//! Each distinct locator gets one subdirectory, named by a hash of the
//! locator so repeated fetches within a run land in the same checkout. The
//! whole tree lives in a temporary directory owned by the parser and is
//! removed when the workspace is dropped.

use std::path::{Path, PathBuf};

use depot_core::ContentDigest;
use tempfile::TempDir;

/// A disposable directory tree holding one checkout per remote locator.
#[derive(Debug)]
pub struct CloneWorkspace {
    root: TempDir,
}

impl CloneWorkspace {
    /// Create a fresh workspace under the system temp directory.
    pub fn new() -> std::io::Result<Self> {
        let root = tempfile::Builder::new().prefix("depot-workspace-").tempdir()?;
        Ok(CloneWorkspace { root })
    }

    /// The workspace root.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// The checkout directory for a locator (not created yet).
    pub fn checkout_dir(&self, locator: &str) -> PathBuf {
        self.root
            .path()
            .join(ContentDigest::of_bytes(locator.as_bytes()).as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_locator_same_dir() {
        let ws = CloneWorkspace::new().unwrap();
        assert_eq!(
            ws.checkout_dir("https://example.com/a.git"),
            ws.checkout_dir("https://example.com/a.git")
        );
    }

    #[test]
    fn distinct_locators_distinct_dirs() {
        let ws = CloneWorkspace::new().unwrap();
        assert_ne!(
            ws.checkout_dir("https://example.com/a.git"),
            ws.checkout_dir("https://example.com/b.git")
        );
    }

    #[test]
    fn checkout_dirs_live_under_root() {
        let ws = CloneWorkspace::new().unwrap();
        let dir = ws.checkout_dir("https://example.com/a.git");
        assert!(dir.starts_with(ws.path()));
    }

    #[test]
    fn dropped_workspace_is_removed() {
        let ws = CloneWorkspace::new().unwrap();
        let root = ws.path().to_path_buf();
        std::fs::create_dir_all(ws.checkout_dir("x")).unwrap();
        drop(ws);
        assert!(!root.exists());
    }
}

//! Git fixture repositories for pipeline tests.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// A throwaway git repository whose revisions carry `depot.json` manifests.
pub(crate) struct SourceRepo {
    dir: TempDir,
}

impl SourceRepo {
    /// Initialize an empty repository with committer identity configured.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path();
        git(path, &["init", "--quiet"]);
        configure(path);
        SourceRepo { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The repository path, usable as a clone URL.
    pub fn url(&self) -> &str {
        self.dir.path().to_str().expect("tempdir path is UTF-8")
    }

    /// Write `depot.json` and commit it.
    pub fn commit_manifest(&self, manifest: &str) {
        std::fs::write(self.path().join("depot.json"), manifest).unwrap();
        git(self.path(), &["add", "."]);
        git(self.path(), &["commit", "--quiet", "-m", "update manifest"]);
    }

    /// Commit a file without touching the manifest.
    pub fn commit_file(&self, name: &str, contents: &str) {
        std::fs::write(self.path().join(name), contents).unwrap();
        git(self.path(), &["add", "."]);
        git(self.path(), &["commit", "--quiet", "-m", name]);
    }

    pub fn tag(&self, name: &str) {
        git(self.path(), &["tag", name]);
    }

    pub fn branch(&self, name: &str) {
        git(self.path(), &["branch", name]);
    }

    /// Clone this repository into a fresh fixture (for operations that
    /// inspect remote branches).
    pub fn cloned(&self) -> SourceRepo {
        let dir = tempfile::tempdir().unwrap();
        let output = Command::new("git")
            .args(["clone", "--quiet", self.url()])
            .arg(dir.path())
            .output()
            .expect("spawn git");
        assert!(
            output.status.success(),
            "git clone failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        configure(dir.path());
        SourceRepo { dir }
    }
}

fn configure(path: &Path) {
    git(path, &["config", "user.email", "depot@test"]);
    git(path, &["config", "user.name", "depot"]);
    git(path, &["config", "commit.gpgsign", "false"]);
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

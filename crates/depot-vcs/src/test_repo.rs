//! Throwaway git repositories for tests.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// A freshly initialized git repository with one commit, usable as a clone
/// source via its filesystem path.
pub(crate) struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a repository with one commit and the given tags.
    pub fn with_tags(tags: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path();
        run(path, &["init", "--quiet"]);
        run(path, &["config", "user.email", "depot@test"]);
        run(path, &["config", "user.name", "depot"]);
        run(path, &["config", "commit.gpgsign", "false"]);
        std::fs::write(path.join("README"), "fixture\n").unwrap();
        run(path, &["add", "."]);
        run(path, &["commit", "--quiet", "-m", "initial"]);
        for tag in tags {
            run(path, &["tag", tag]);
        }
        TestRepo { dir }
    }

    /// The repository path, usable as a git URL.
    pub fn url(&self) -> &str {
        self.dir.path().to_str().expect("tempdir path is UTF-8")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a tag pointing at HEAD.
    pub fn tag(&self, name: &str) {
        run(self.path(), &["tag", name]);
    }

    /// Create a branch pointing at HEAD.
    pub fn branch(&self, name: &str) {
        run(self.path(), &["branch", name]);
    }
}

fn run(dir: &Path, args: &[&str]) {
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

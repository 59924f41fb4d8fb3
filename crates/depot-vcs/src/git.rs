//! Subprocess wrapper around the system `git`.
//!
//! Every operation spawns `git` with null stdin, captured output, and a
//! bounded time budget: a child that outlives the budget is killed and the
//! invocation reported as a timeout. Output is drained on reader threads so
//! a chatty child can never block on a full pipe while the parent polls.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::{Result, VcsError};

/// Default time budget per git invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A configured handle for running git operations.
#[derive(Debug, Clone)]
pub struct GitClient {
    timeout: Duration,
}

impl Default for GitClient {
    fn default() -> Self {
        GitClient::new(DEFAULT_TIMEOUT)
    }
}

impl GitClient {
    /// Create a client with the given per-invocation time budget.
    pub fn new(timeout: Duration) -> Self {
        GitClient { timeout }
    }

    /// Check that `git` is invocable at all.
    pub fn available(&self) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.arg("--version");
        self.run("--version", cmd).map(|_| ())
    }

    /// Whether `path` holds a git checkout.
    pub fn is_repository(path: &Path) -> bool {
        path.join(".git").exists()
    }

    /// Clone `url` into `target`.
    pub fn clone_repo(&self, url: &str, target: &Path) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.args(["clone", url]).arg(target);
        self.run("clone", cmd).map(|_| ())
    }

    /// Refresh an existing checkout: fetch all branches and tags.
    pub fn update(&self, repo: &Path) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(repo)
            .args(["fetch", "--tags", "--prune", "origin"]);
        self.run("fetch", cmd).map(|_| ())
    }

    /// Check out a revision reference (tag, branch, or commit id).
    pub fn checkout(&self, repo: &Path, reference: &str) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(repo)
            .args(["checkout", "--force", reference]);
        self.run("checkout", cmd).map(|_| ())
    }

    /// List all tag names in the repository.
    pub fn list_tags(&self, repo: &Path) -> Result<Vec<String>> {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(repo).args(["tag", "--list"]);
        let output = self.run_text("tag", cmd)?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// List remote branch names with the remote prefix stripped.
    ///
    /// The symbolic `HEAD` pointer is skipped.
    pub fn list_remote_branches(&self, repo: &Path) -> Result<Vec<String>> {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(repo).args(["branch", "-r"]);
        let output = self.run_text("branch", cmd)?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.contains("->"))
            .map(|l| l.split_once('/').map_or(l, |(_, rest)| rest))
            .filter(|name| *name != "HEAD")
            .map(String::from)
            .collect())
    }

    /// Export the tree at `reference` as a zip archive written to `out`.
    pub fn export_zip(&self, repo: &Path, reference: &str, out: &Path) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(repo)
            .args(["archive", "--format=zip", "-o"])
            .arg(out)
            .arg(reference);
        self.run("archive", cmd).map(|_| ())
    }

    fn run_text(&self, action: &str, cmd: Command) -> Result<String> {
        let bytes = self.run(action, cmd)?;
        String::from_utf8(bytes).map_err(|_| VcsError::NonUtf8Output {
            action: action.to_string(),
        })
    }

    /// Spawn a git command, enforce the time budget, and return stdout.
    fn run(&self, action: &str, mut cmd: Command) -> Result<Vec<u8>> {
        tracing::debug!(action, "invoking git");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VcsError::GitUnavailable
            } else {
                VcsError::Io(e)
            }
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(VcsError::Timeout {
                    action: action.to_string(),
                    seconds: self.timeout.as_secs(),
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        if !status.success() {
            return Err(VcsError::CommandFailed {
                action: action.to_string(),
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

/// Read a child pipe to the end on its own thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_repo::TestRepo;

    #[test]
    fn version_probe_succeeds() {
        GitClient::default().available().unwrap();
    }

    #[test]
    fn clone_and_list_tags() {
        let upstream = TestRepo::with_tags(&["v1.0.0", "v1.2.0", "not-semver"]);
        let workdir = tempfile::tempdir().unwrap();
        let target = workdir.path().join("checkout");

        let git = GitClient::default();
        git.clone_repo(upstream.url(), &target).unwrap();
        assert!(GitClient::is_repository(&target));

        let mut tags = git.list_tags(&target).unwrap();
        tags.sort();
        assert_eq!(tags, vec!["not-semver", "v1.0.0", "v1.2.0"]);
    }

    #[test]
    fn update_refreshes_new_tags() {
        let upstream = TestRepo::with_tags(&["v1.0.0"]);
        let workdir = tempfile::tempdir().unwrap();
        let target = workdir.path().join("checkout");

        let git = GitClient::default();
        git.clone_repo(upstream.url(), &target).unwrap();
        upstream.tag("v2.0.0");

        git.update(&target).unwrap();
        let tags = git.list_tags(&target).unwrap();
        assert!(tags.contains(&"v2.0.0".to_string()), "got {tags:?}");
    }

    #[test]
    fn remote_branches_skip_symbolic_head() {
        let upstream = TestRepo::with_tags(&[]);
        upstream.branch("feature-x");
        let workdir = tempfile::tempdir().unwrap();
        let target = workdir.path().join("checkout");

        let git = GitClient::default();
        git.clone_repo(upstream.url(), &target).unwrap();

        let branches = git.list_remote_branches(&target).unwrap();
        assert!(branches.contains(&"feature-x".to_string()), "got {branches:?}");
        assert!(!branches.iter().any(|b| b == "HEAD"), "got {branches:?}");
    }

    #[test]
    fn checkout_tag_detaches() {
        let upstream = TestRepo::with_tags(&["v1.0.0"]);
        let workdir = tempfile::tempdir().unwrap();
        let target = workdir.path().join("checkout");

        let git = GitClient::default();
        git.clone_repo(upstream.url(), &target).unwrap();
        git.checkout(&target, "v1.0.0").unwrap();
    }

    #[test]
    fn failed_command_reports_stderr() {
        let workdir = tempfile::tempdir().unwrap();
        let git = GitClient::default();
        let err = git.list_tags(workdir.path()).unwrap_err();
        assert!(matches!(err, VcsError::CommandFailed { .. }), "got {err:?}");
    }

    #[test]
    fn exhausted_budget_is_a_timeout() {
        let upstream = TestRepo::with_tags(&["v1.0.0"]);
        let workdir = tempfile::tempdir().unwrap();
        let target = workdir.path().join("checkout");

        let git = GitClient::new(Duration::ZERO);
        let err = git.clone_repo(upstream.url(), &target).unwrap_err();
        assert!(matches!(err, VcsError::Timeout { .. }), "got {err:?}");
    }
}

//! Version resolution policy for a checked-out source.
//!
//! Tags become version keys (leading `v` stripped, optionally restricted to
//! the canonical semver grammar); remote branches optionally join as
//! `dev-<branch>` entries. The result is ordered newest first: real semver
//! precedence when both keys parse as semver, lexicographic otherwise.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use depot_vcs::GitClient;

use crate::source::SourceOptions;

/// One resolved index key and the revision it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// The version string used as index key.
    pub version: String,
    /// The revision reference to check out (original tag or branch name).
    pub reference: String,
}

/// Enumerate and order the versions a working copy offers.
///
/// A failed tag listing is treated as zero tags, not an error, so a
/// repository with only branches still resolves.
pub fn resolve_versions(
    git: &GitClient,
    repo: &Path,
    options: &SourceOptions,
) -> Vec<ResolvedVersion> {
    let mut entries: BTreeMap<String, String> = BTreeMap::new();

    match git.list_tags(repo) {
        Ok(tags) => {
            for tag in tags {
                let stripped = tag.strip_prefix('v').unwrap_or(&tag);
                if options.semver_only && semver::Version::parse(stripped).is_err() {
                    continue;
                }
                entries.insert(stripped.to_string(), tag.clone());
            }
        }
        Err(err) => {
            tracing::warn!(repo = %repo.display(), %err, "tag listing failed; treating as zero tags");
        }
    }

    if options.include_dev {
        match git.list_remote_branches(repo) {
            Ok(branches) => {
                for branch in branches {
                    entries.insert(format!("dev-{branch}"), branch);
                }
            }
            Err(err) => {
                tracing::warn!(repo = %repo.display(), %err, "branch listing failed; skipping dev versions");
            }
        }
    }

    let mut resolved: Vec<ResolvedVersion> = entries
        .into_iter()
        .map(|(version, reference)| ResolvedVersion { version, reference })
        .collect();
    resolved.sort_by(|a, b| compare_versions(&b.version, &a.version));
    resolved
}

/// Ascending version comparison: semver precedence when both sides parse
/// as canonical semver, plain string ordering otherwise.
fn compare_versions(a: &str, b: &str) -> Ordering {
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

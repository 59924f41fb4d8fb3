//! Archive export: snapshot a revision into a portable zip artifact.

use std::path::{Path, PathBuf};

use depot_core::ContentDigest;

use crate::error::Result;
use crate::git::GitClient;

/// A produced archive artifact.
#[derive(Debug, Clone)]
pub struct ArchiveOutput {
    /// Path of the zip file.
    pub path: PathBuf,
    /// SHA-256 checksum of the archive bytes.
    pub checksum: String,
}

/// Exports package revisions as deterministically named zip archives.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    out_dir: PathBuf,
}

impl ArchiveBuilder {
    /// Create a builder writing archives into `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        ArchiveBuilder {
            out_dir: out_dir.into(),
        }
    }

    /// The directory archives are written into.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Export `reference` from the checkout at `repo` as
    /// `<out-dir>/<name>-<version>.zip` (path separators in either
    /// component escaped) and compute its checksum.
    pub fn build(
        &self,
        git: &GitClient,
        repo: &Path,
        name: &str,
        version: &str,
        reference: &str,
    ) -> Result<ArchiveOutput> {
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(archive_file_name(name, version));
        git.export_zip(repo, reference, &path)?;
        let bytes = std::fs::read(&path)?;
        Ok(ArchiveOutput {
            path,
            checksum: ContentDigest::of_bytes(&bytes).as_str().to_string(),
        })
    }
}

/// Deterministic archive file name for a package version.
pub fn archive_file_name(name: &str, version: &str) -> String {
    format!("{}-{}.zip", sanitize(name), sanitize(version))
}

fn sanitize(component: &str) -> String {
    component.replace(['/', '\\'], "$")
}

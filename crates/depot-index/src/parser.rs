//! Per-source parsing: fetch, resolve versions, read manifests, attach
//! provenance and archives, accumulate a [`PackageSet`].
//!
//! Failures follow the pipeline's granularity rules: a bad revision is
//! skipped with a diagnostic, a bad source is an error for that source
//! only, and the orchestrator decides what a run-level failure is.

use std::path::Path;

use depot_manifest::{DistRef, ManifestError, PackageRecord, PackageSet, Provenance, SourceRef};
use depot_vcs::{ArchiveBuilder, AuthTokens, CloneWorkspace, GitClient, LocatorKind};

use crate::error::SourceError;
use crate::filter::{self, PackageFilter};
use crate::resolver::resolve_versions;
use crate::source::Source;

/// Subdirectory of the output root that archives are exported into, and
/// the prefix of the relative `dist.url` recorded in metadata.
pub const ARCHIVE_DIR: &str = "dist";

/// Parses one source at a time into a [`PackageSet`].
///
/// Owns the private clone workspace; dropping the parser removes every
/// checkout it made.
pub struct SourceParser {
    git: GitClient,
    workspace: CloneWorkspace,
    archive: Option<ArchiveBuilder>,
}

impl SourceParser {
    /// Create a parser. `archive` is the builder for the proxying archive
    /// directory, when archiving is enabled for the run.
    pub fn new(git: GitClient, archive: Option<ArchiveBuilder>) -> std::io::Result<Self> {
        Ok(SourceParser {
            git,
            workspace: CloneWorkspace::new()?,
            archive,
        })
    }

    /// Parse one source into `name → version → metadata`.
    pub fn parse(
        &self,
        source: &Source,
        global_filter: Option<&PackageFilter>,
        tokens: &AuthTokens,
    ) -> Result<PackageSet, SourceError> {
        match source.kind {
            LocatorKind::RemoteVcs => self.parse_remote(source, global_filter, tokens),
            LocatorKind::LocalPath => self.parse_local(source, global_filter),
        }
    }

    fn parse_remote(
        &self,
        source: &Source,
        global_filter: Option<&PackageFilter>,
        tokens: &AuthTokens,
    ) -> Result<PackageSet, SourceError> {
        let fetch_url = tokens.apply(&source.locator);
        let checkout = self.workspace.checkout_dir(&source.locator);
        if GitClient::is_repository(&checkout) {
            self.git.update(&checkout)?;
        } else {
            self.git.clone_repo(&fetch_url, &checkout)?;
        }

        let mut set = PackageSet::new();
        for resolved in resolve_versions(&self.git, &checkout, &source.options) {
            if let Err(err) = self.git.checkout(&checkout, &resolved.reference) {
                tracing::warn!(
                    reference = %resolved.reference,
                    %err,
                    "checkout failed; skipping version"
                );
                continue;
            }
            let mut record = match PackageRecord::load_from_dir(&checkout) {
                Ok(record) => record,
                Err(ManifestError::Missing { .. }) => {
                    // Many revisions predate the manifest; not an error.
                    tracing::debug!(version = %resolved.version, "no manifest at this revision");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(
                        version = %resolved.version,
                        %err,
                        "unusable manifest; skipping version"
                    );
                    continue;
                }
            };
            record.apply_provenance(&Provenance {
                version: Some(resolved.version.clone()),
                source: Some(SourceRef::git(fetch_url.clone(), resolved.reference.clone())),
            });
            if !filter::accepts(global_filter, source.filter.as_ref(), &record) {
                continue;
            }
            if source.options.archive {
                self.attach_archive(&checkout, &mut record, &resolved.version, &resolved.reference);
            }
            let name = record.name.clone();
            set.entry(name).or_default().insert(resolved.version, record);
        }

        if set.is_empty() {
            return Err(SourceError::NoUsableVersions {
                locator: source.locator.clone(),
            });
        }
        Ok(set)
    }

    /// A local path offers exactly one version, named by its own manifest.
    fn parse_local(
        &self,
        source: &Source,
        global_filter: Option<&PackageFilter>,
    ) -> Result<PackageSet, SourceError> {
        let dir = Path::new(&source.locator);
        let mut record = PackageRecord::load_from_dir(dir)?;
        let version = record.require_version()?.to_string();
        record.apply_provenance(&Provenance {
            version: Some(version.clone()),
            source: Some(SourceRef::path(source.locator.clone())),
        });
        if !filter::accepts(global_filter, source.filter.as_ref(), &record) {
            return Err(SourceError::NoUsableVersions {
                locator: source.locator.clone(),
            });
        }
        let mut set = PackageSet::new();
        set.entry(record.name.clone())
            .or_default()
            .insert(version, record);
        Ok(set)
    }

    /// Best-effort archive export: a failure is logged and the version
    /// proceeds without `dist`.
    fn attach_archive(
        &self,
        checkout: &Path,
        record: &mut PackageRecord,
        version: &str,
        reference: &str,
    ) {
        let Some(archive) = &self.archive else {
            return;
        };
        match archive.build(&self.git, checkout, &record.name, version, reference) {
            Ok(output) => {
                let file = output
                    .path
                    .file_name()
                    .and_then(|f| f.to_str())
                    .unwrap_or_default();
                record.dist = Some(DistRef::zip(
                    format!("{ARCHIVE_DIR}/{file}"),
                    reference,
                    output.checksum,
                ));
            }
            Err(err) => {
                tracing::warn!(
                    package = %record.name,
                    %version,
                    %err,
                    "archive export failed; continuing without dist"
                );
            }
        }
    }
}

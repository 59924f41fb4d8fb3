//! Reading, validation, and normalization of `depot.json` manifests.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, Result};

/// File name of the package manifest at a working-copy root.
pub const MANIFEST_FILE: &str = "depot.json";

/// Normalized metadata for one package at one version.
///
/// Known fields are typed; everything else the manifest carries passes
/// through `extra` verbatim. `BTreeMap` keeps serialization deterministic,
/// which the content-hash-addressed output files rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Package name, `vendor/package` shaped.
    pub name: String,
    /// Version string (tag-derived for VCS sources, manifest-supplied for
    /// local ones).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Package type (e.g. "library"), passed through from the manifest.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Origin descriptor, attached by the parser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    /// Archive descriptor, attached when proxying is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<DistRef>,
    /// All remaining manifest fields, verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Where a package version came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Origin kind: `git` or `path`.
    pub kind: String,
    /// The locator the metadata was produced from (token-rewritten for
    /// authenticated fetches).
    pub url: String,
    /// VCS revision reference; absent for local paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl SourceRef {
    /// Origin descriptor for a git revision.
    pub fn git(url: impl Into<String>, reference: impl Into<String>) -> Self {
        SourceRef {
            kind: "git".to_string(),
            url: url.into(),
            reference: Some(reference.into()),
        }
    }

    /// Origin descriptor for a local path.
    pub fn path(url: impl Into<String>) -> Self {
        SourceRef {
            kind: "path".to_string(),
            url: url.into(),
            reference: None,
        }
    }
}

/// A downloadable archive of a package version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistRef {
    /// Archive kind; always `zip`.
    pub kind: String,
    /// Archive location relative to the output root.
    pub url: String,
    /// The revision the archive was exported from.
    pub reference: String,
    /// SHA-256 checksum of the archive bytes.
    pub shasum: String,
}

impl DistRef {
    /// Archive descriptor for a zip export.
    pub fn zip(
        url: impl Into<String>,
        reference: impl Into<String>,
        shasum: impl Into<String>,
    ) -> Self {
        DistRef {
            kind: "zip".to_string(),
            url: url.into(),
            reference: reference.into(),
            shasum: shasum.into(),
        }
    }
}

/// Caller-supplied provenance merged into a manifest on read.
///
/// Provenance wins over whatever the manifest itself claims: a tag-derived
/// version overrides a stale `version` field left in the file.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    /// Version string to record, if the caller resolved one.
    pub version: Option<String>,
    /// Origin descriptor to record.
    pub source: Option<SourceRef>,
}

/// The per-source parse result and aggregate merge target:
/// package name → version string → metadata.
pub type PackageSet = BTreeMap<String, BTreeMap<String, PackageRecord>>;

impl PackageRecord {
    /// Parse a manifest from a JSON string.
    pub fn parse(input: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        let name = match value.get("name").and_then(|n| n.as_str()) {
            Some(name) => name.to_string(),
            None => return Err(ManifestError::MissingName),
        };
        if !is_valid_name(&name) {
            return Err(ManifestError::InvalidName { name });
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ManifestError::Missing {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load the manifest at a working-copy root (`<dir>/depot.json`).
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load(&dir.join(MANIFEST_FILE))
    }

    /// Merge caller-supplied provenance into this record.
    pub fn apply_provenance(&mut self, provenance: &Provenance) {
        if let Some(version) = &provenance.version {
            self.version = Some(version.clone());
        }
        if let Some(source) = &provenance.source {
            self.source = Some(source.clone());
        }
    }

    /// The version this record claims, or a [`ManifestError::MissingVersion`].
    pub fn require_version(&self) -> Result<&str> {
        self.version
            .as_deref()
            .ok_or_else(|| ManifestError::MissingVersion {
                name: self.name.clone(),
            })
    }
}

/// Check that a package name is `vendor/package` shaped.
fn is_valid_name(name: &str) -> bool {
    let mut parts = name.split('/');
    let (vendor, package) = match (parts.next(), parts.next(), parts.next()) {
        (Some(v), Some(p), None) => (v, p),
        _ => return false,
    };
    let segment_ok = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    segment_ok(vendor) && segment_ok(package)
}

/// Escape a package name for use as a flat file name: path separators
/// become `$`, so `vendor/package` emits as `vendor$package.json`.
pub fn escape_package_name(name: &str) -> String {
    name.replace(['/', '\\'], "$")
}

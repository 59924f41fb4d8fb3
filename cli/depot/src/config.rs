//! `depot.toml` project configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use depot_index::SourceOptions;

/// The top-level configuration for a depot project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepotConfig {
    /// Index settings (required).
    pub index: IndexSection,
    /// Authentication tokens, host → token.
    #[serde(default)]
    pub auth: BTreeMap<String, String>,
    /// The sources to index.
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// The `[index]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSection {
    /// Informational index name.
    #[serde(default)]
    pub name: Option<String>,
    /// Directory the index artifacts are written into.
    #[serde(default = "default_output_dir", rename = "output-dir")]
    pub output_dir: String,
    /// Directory for cached per-source parse results.
    #[serde(default = "default_cache_dir", rename = "cache-dir")]
    pub cache_dir: String,
    /// Enable archive proxying; sources default to it unless overridden.
    #[serde(default)]
    pub archive: bool,
    /// Optional name-prefix allowlist applied to every source.
    #[serde(default)]
    pub packages: Vec<String>,
}

fn default_output_dir() -> String {
    "public".to_string()
}

fn default_cache_dir() -> String {
    ".depot-cache".to_string()
}

/// One `[[sources]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Remote repository URL or local path.
    pub locator: String,
    /// Keep only canonical-semver tags.
    #[serde(default, rename = "semver-only")]
    pub semver_only: bool,
    /// Also index branches as `dev-` versions.
    #[serde(default, rename = "include-dev")]
    pub include_dev: bool,
    /// Per-source archive override (defaults to `index.archive`).
    #[serde(default)]
    pub archive: Option<bool>,
}

impl SourceEntry {
    /// Resolve this entry to source options, defaulting the archive flag
    /// from the index-wide setting.
    pub fn options(&self, default_archive: bool) -> SourceOptions {
        SourceOptions {
            semver_only: self.semver_only,
            include_dev: self.include_dev,
            archive: self.archive.unwrap_or(default_archive),
        }
    }
}

impl DepotConfig {
    /// The configuration file name.
    pub const FILE_NAME: &'static str = "depot.toml";

    /// Parse a configuration from a TOML string.
    pub fn parse(input: &str) -> Result<Self> {
        toml::from_str(input).context("parsing depot.toml")
    }

    /// Load a configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Search upward from `start_dir` for a `depot.toml`, parse and return
    /// it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(Self::FILE_NAME);
            if candidate.is_file() {
                return Ok(Some((Self::load(&candidate)?, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Generate the default template for `depot init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[index]
name = "{name}"
output-dir = "public"
cache-dir = ".depot-cache"

# [[sources]]
# locator = "https://github.com/acme/widget.git"
# semver-only = true
"#
        )
    }
}

//! Index pipeline error types.

use std::path::PathBuf;

use depot_manifest::ManifestError;
use depot_vcs::VcsError;

/// Why a single source contributed nothing to the index.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Clone, fetch, or checkout failure.
    #[error("fetch failed: {0}")]
    Fetch(#[from] VcsError),

    /// The source's manifest was unusable (fatal only where the manifest
    /// is mandatory, i.e. local sources).
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// No revision of the source yielded any package metadata.
    #[error("no usable versions found for '{locator}'")]
    NoUsableVersions { locator: String },
}

/// Errors surfaced by the index builder.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// `generate()` was called with no registered sources.
    #[error("no sources registered")]
    NoSources,

    /// Cache maintenance failure (never raised from a cache read, which
    /// degrades to a miss).
    #[error("cache error at {path}: {detail}")]
    Cache { path: PathBuf, detail: String },

    /// Every registered source failed and nothing was aggregated.
    #[error("every registered source failed: {}", .failures.join("; "))]
    AllSourcesFailed { failures: Vec<String> },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

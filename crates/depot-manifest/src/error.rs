//! Manifest error types.

use std::path::PathBuf;

/// Errors that can occur while reading or validating a package manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// No manifest file at the working-copy root.
    #[error("no manifest found at {path}")]
    Missing { path: PathBuf },

    /// Manifest exists but is not valid structured data.
    #[error("invalid manifest: {0}")]
    Parse(#[from] serde_json::Error),

    /// Manifest has no `name` field.
    #[error("manifest has no package name")]
    MissingName,

    /// Package name is not `vendor/package` shaped.
    #[error("invalid package name '{name}' (expected vendor/package)")]
    InvalidName { name: String },

    /// A local source's manifest carries no version, so the source has
    /// nothing to offer.
    #[error("manifest for '{name}' has no version")]
    MissingVersion { name: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for manifest operations.
pub type Result<T> = std::result::Result<T, ManifestError>;

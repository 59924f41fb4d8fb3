//! Package manifest model and normalization.
//!
//! A source revision describes itself with a `depot.json` manifest at its
//! root: structured JSON keyed at minimum by `name` (`vendor/package`
//! shaped), optionally carrying `version`, `type`, and arbitrary further
//! fields that pass through into the emitted index verbatim.
//!
//! This crate owns the normalized [`PackageRecord`] those manifests become,
//! the provenance descriptors ([`SourceRef`], [`DistRef`]) the pipeline
//! merges in, and the reading/validation path itself.

pub mod error;
pub mod manifest;

pub use error::{ManifestError, Result};
pub use manifest::{
    escape_package_name, DistRef, PackageRecord, PackageSet, Provenance, SourceRef, MANIFEST_FILE,
};

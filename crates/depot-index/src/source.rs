//! Registered sources and their options.

use serde::Serialize;

use depot_vcs::{classify, LocatorKind};

use crate::filter::PackageFilter;

/// Plain-data options for one source.
///
/// This struct feeds the cache-key derivation, so it must stay pure data:
/// the per-source filter predicate lives on [`Source`] instead and never
/// participates in the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceOptions {
    /// Keep only tags matching the canonical semantic-version grammar.
    #[serde(rename = "semver-only")]
    pub semver_only: bool,
    /// Also index branches as `dev-<branch>` versions.
    #[serde(rename = "include-dev")]
    pub include_dev: bool,
    /// Export a zip archive per version when proxying is enabled.
    pub archive: bool,
}

/// A registered origin: locator, inferred kind, options, and an optional
/// per-source filter.
#[derive(Clone)]
pub struct Source {
    /// The locator as registered (URL or path).
    pub locator: String,
    /// Remote repository or local directory, inferred from the locator.
    pub kind: LocatorKind,
    /// Per-source options.
    pub options: SourceOptions,
    /// Per-source filter predicate; composed with the global one.
    pub filter: Option<PackageFilter>,
}

impl Source {
    /// Register a source, classifying the locator.
    pub fn new(locator: impl Into<String>, options: SourceOptions) -> Self {
        let locator = locator.into();
        let kind = classify(&locator);
        Source {
            locator,
            kind,
            options,
            filter: None,
        }
    }

    /// Attach a per-source filter.
    pub fn with_filter(mut self, filter: PackageFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("locator", &self.locator)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("filter", &self.filter.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

//! The index builder: source registration surface and generation
//! orchestration.
//!
//! `generate()` walks the registered sources in order, obtains each one's
//! metadata from the cache or the parser, folds the per-source outcomes
//! into one aggregate mapping, and emits the artifact set. A failing
//! source never aborts the run on its own; only a run where every source
//! failed does.

use std::path::{Path, PathBuf};
use std::time::Duration;

use depot_manifest::PackageSet;
use depot_vcs::{git, ArchiveBuilder, AuthTokens, GitClient};

use crate::cache::ParseCache;
use crate::emit::IndexWriter;
use crate::error::{IndexError, Result, SourceError};
use crate::filter::PackageFilter;
use crate::parser::{SourceParser, ARCHIVE_DIR};
use crate::source::{Source, SourceOptions};

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "public";

/// Default cache directory.
pub const DEFAULT_CACHE_DIR: &str = ".depot-cache";

/// What one source contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStats {
    /// Distinct package names.
    pub packages: usize,
    /// Total version entries across all packages.
    pub versions: usize,
    /// Whether the result came from the cache.
    pub from_cache: bool,
}

/// The recorded fate of one registered source.
#[derive(Debug)]
pub struct SourceOutcome {
    /// The locator as registered.
    pub locator: String,
    /// Stats on success, the typed failure otherwise.
    pub result: std::result::Result<SourceStats, SourceError>,
}

/// What `generate()` produced.
#[derive(Debug)]
pub struct GenerateSummary {
    /// Path of the emitted aggregate descriptor.
    pub descriptor_path: PathBuf,
    /// Per-source outcomes in registration order.
    pub outcomes: Vec<SourceOutcome>,
}

/// Builds a static package index from registered sources.
pub struct IndexBuilder {
    sources: Vec<Source>,
    global_filter: Option<PackageFilter>,
    use_cache: bool,
    output_dir: PathBuf,
    cache_dir: PathBuf,
    tokens: AuthTokens,
    archive_proxying: bool,
    git_timeout: Duration,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        IndexBuilder {
            sources: Vec::new(),
            global_filter: None,
            use_cache: true,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            tokens: AuthTokens::new(),
            archive_proxying: false,
            git_timeout: git::DEFAULT_TIMEOUT,
        }
    }
}

impl IndexBuilder {
    /// Create a builder with default directories, caching enabled, and
    /// archiving disabled.
    pub fn new() -> Self {
        IndexBuilder::default()
    }

    /// Register a source. Re-registering a locator replaces its options
    /// (and filter) while keeping its original position.
    pub fn add_source(&mut self, locator: impl Into<String>, options: SourceOptions) -> &mut Self {
        self.insert(Source::new(locator, options));
        self
    }

    /// Register a source with a per-source filter.
    pub fn add_source_with_filter(
        &mut self,
        locator: impl Into<String>,
        options: SourceOptions,
        filter: PackageFilter,
    ) -> &mut Self {
        self.insert(Source::new(locator, options).with_filter(filter));
        self
    }

    /// Register several sources at once.
    pub fn add_sources<I, L>(&mut self, sources: I) -> &mut Self
    where
        I: IntoIterator<Item = (L, SourceOptions)>,
        L: Into<String>,
    {
        for (locator, options) in sources {
            self.add_source(locator, options);
        }
        self
    }

    fn insert(&mut self, source: Source) {
        match self.sources.iter_mut().find(|s| s.locator == source.locator) {
            Some(existing) => *existing = source,
            None => self.sources.push(source),
        }
    }

    /// Set the filter applied to every source.
    pub fn set_package_filter(&mut self, filter: PackageFilter) -> &mut Self {
        self.global_filter = Some(filter);
        self
    }

    /// Enable or disable the per-source parse cache.
    pub fn use_cache(&mut self, enabled: bool) -> &mut Self {
        self.use_cache = enabled;
        self
    }

    /// Set the directory the index artifacts are written into.
    pub fn set_output_dir(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.output_dir = path.into();
        self
    }

    /// Set the cache directory.
    pub fn set_cache_dir(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.cache_dir = path.into();
        self
    }

    /// Register an authentication token for a host (default `github.com`).
    pub fn add_auth_token(&mut self, token: impl Into<String>, host: Option<&str>) -> &mut Self {
        self.tokens.add(token, host);
        self
    }

    /// Enable archiving: every source with the `archive` option exports a
    /// zip per version into `<output>/dist`.
    pub fn enable_archive_proxying(&mut self, enabled: bool) -> &mut Self {
        self.archive_proxying = enabled;
        self
    }

    /// Set the time budget per external git invocation.
    pub fn set_git_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.git_timeout = timeout;
        self
    }

    /// The configured output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Drop cache entries: all of them, or only one locator's.
    /// Returns whether anything was removed.
    pub fn clean_cache(&self, locator: Option<&str>) -> Result<bool> {
        ParseCache::new(&self.cache_dir).invalidate(locator)
    }

    /// Generate the index: parse (or recall) every source, merge, emit.
    pub fn generate(&mut self) -> Result<GenerateSummary> {
        if self.sources.is_empty() {
            return Err(IndexError::NoSources);
        }

        let cache = ParseCache::new(&self.cache_dir);
        let archive = self
            .archive_proxying
            .then(|| ArchiveBuilder::new(self.output_dir.join(ARCHIVE_DIR)));
        let parser = SourceParser::new(GitClient::new(self.git_timeout), archive)?;

        let mut merged = PackageSet::new();
        let mut outcomes = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let (result, from_cache) = if !self.use_cache {
                let parsed = parser.parse(source, self.global_filter.as_ref(), &self.tokens);
                (parsed, false)
            } else if let Some(hit) = cache.get(source) {
                (Ok(hit), true)
            } else {
                (self.parse_and_store(&parser, &cache, source), false)
            };
            match result {
                Ok(set) => {
                    outcomes.push(SourceOutcome {
                        locator: source.locator.clone(),
                        result: Ok(stats(&set, from_cache)),
                    });
                    merge_into(&mut merged, set, &source.locator);
                }
                Err(err) => {
                    tracing::warn!(locator = %source.locator, %err, "source failed; continuing");
                    outcomes.push(SourceOutcome {
                        locator: source.locator.clone(),
                        result: Err(err),
                    });
                }
            }
        }

        if merged.is_empty() && outcomes.iter().all(|o| o.result.is_err()) {
            return Err(IndexError::AllSourcesFailed {
                failures: outcomes
                    .iter()
                    .filter_map(|o| {
                        o.result
                            .as_ref()
                            .err()
                            .map(|e| format!("{}: {e}", o.locator))
                    })
                    .collect(),
            });
        }

        let descriptor_path = IndexWriter::new(&self.output_dir).write(&merged)?;
        Ok(GenerateSummary {
            descriptor_path,
            outcomes,
        })
    }

    fn parse_and_store(
        &self,
        parser: &SourceParser,
        cache: &ParseCache,
        source: &Source,
    ) -> std::result::Result<PackageSet, SourceError> {
        let set = parser.parse(source, self.global_filter.as_ref(), &self.tokens)?;
        if let Err(err) = cache.put(source, &set) {
            tracing::warn!(locator = %source.locator, %err, "cache write failed; continuing");
        }
        Ok(set)
    }
}

fn stats(set: &PackageSet, from_cache: bool) -> SourceStats {
    SourceStats {
        packages: set.len(),
        versions: set.values().map(|v| v.len()).sum(),
        from_cache,
    }
}

/// Merge one source's result into the aggregate. Later sources win on an
/// exact name+version collision, with a diagnostic.
fn merge_into(aggregate: &mut PackageSet, set: PackageSet, locator: &str) {
    for (name, versions) in set {
        let slot = aggregate.entry(name.clone()).or_default();
        for (version, record) in versions {
            if slot.contains_key(&version) {
                tracing::warn!(
                    package = %name,
                    %version,
                    %locator,
                    "version collision; later-registered source wins"
                );
            }
            slot.insert(version, record);
        }
    }
}

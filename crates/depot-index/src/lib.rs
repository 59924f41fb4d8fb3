//! Source-to-index generation pipeline for static package repositories.
//!
//! [`IndexBuilder`] turns a set of registered sources — remote git
//! repositories or local directories carrying a `depot.json` manifest —
//! into a static index a package client can consume without contacting the
//! sources again: one aggregate descriptor plus per-package metadata files
//! in canonical and content-hash-addressed form.
//!
//! # Example
//!
//! ```no_run
//! use depot_index::{IndexBuilder, SourceOptions};
//!
//! let mut builder = IndexBuilder::new();
//! builder
//!     .set_output_dir("public")
//!     .add_source(
//!         "https://github.com/acme/widget.git",
//!         SourceOptions { semver_only: true, ..Default::default() },
//!     );
//! let summary = builder.generate()?;
//! println!("wrote {}", summary.descriptor_path.display());
//! # Ok::<(), depot_index::IndexError>(())
//! ```

pub mod builder;
pub mod cache;
pub mod emit;
pub mod error;
pub mod filter;
pub mod parser;
pub mod resolver;
pub mod source;

#[cfg(test)]
mod test_util;

pub use builder::{GenerateSummary, IndexBuilder, SourceOutcome, SourceStats};
pub use cache::ParseCache;
pub use emit::IndexWriter;
pub use error::{IndexError, Result, SourceError};
pub use filter::{name_prefix_filter, PackageFilter};
pub use parser::SourceParser;
pub use resolver::{resolve_versions, ResolvedVersion};
pub use source::{Source, SourceOptions};

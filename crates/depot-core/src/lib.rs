//! Shared primitives for the depot index generator.
//!
//! Everything the pipeline content-addresses — cache entries, archive
//! artifacts, emitted metadata files — goes through [`ContentDigest`], and
//! every emitted timestamp goes through [`clock`]. Keeping both in one leaf
//! crate means the hash and time formats cannot drift between the VCS layer
//! and the index layer.

pub mod clock;
pub mod hash;

pub use hash::ContentDigest;

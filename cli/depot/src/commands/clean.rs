//! `depot clean` — drop cached parse results.

use std::path::Path;

use anyhow::Result;

use depot_index::ParseCache;

use crate::commands::build::load_config;

/// Invalidate the cache: all of it, or a single locator's entries.
pub fn run(cwd: &Path, config_path: Option<&Path>, locator: Option<&str>) -> Result<()> {
    let (config, base_dir) = load_config(cwd, config_path)?;
    let cache = ParseCache::new(base_dir.join(&config.index.cache_dir));

    let removed = cache.invalidate(locator)?;
    match (locator, removed) {
        (Some(locator), true) => println!("Removed cached entries for {locator}"),
        (Some(locator), false) => println!("No cached entries for {locator}"),
        (None, true) => println!("Cache cleared: {}", cache.root().display()),
        (None, false) => println!("Cache already empty: {}", cache.root().display()),
    }
    Ok(())
}

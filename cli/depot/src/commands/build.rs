//! `depot build` — generate the index from the configured sources.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use depot_index::{name_prefix_filter, IndexBuilder};
use depot_vcs::{classify, LocatorKind};

use crate::config::DepotConfig;

/// Load the configuration and run a full generation.
pub fn run(
    cwd: &Path,
    config_path: Option<&Path>,
    output_dir: Option<&Path>,
    no_cache: bool,
) -> Result<()> {
    let (config, base_dir) = load_config(cwd, config_path)?;
    if config.sources.is_empty() {
        bail!("no sources configured in depot.toml");
    }

    let mut builder = IndexBuilder::new();
    let output = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => base_dir.join(&config.index.output_dir),
    };
    builder
        .set_output_dir(&output)
        .set_cache_dir(base_dir.join(&config.index.cache_dir))
        .use_cache(!no_cache);

    let archive_any = config.index.archive
        || config.sources.iter().any(|s| s.archive == Some(true));
    builder.enable_archive_proxying(archive_any);

    if !config.index.packages.is_empty() {
        builder.set_package_filter(name_prefix_filter(config.index.packages.clone()));
    }
    for (host, token) in &config.auth {
        builder.add_auth_token(token, Some(host.as_str()));
    }
    for entry in &config.sources {
        builder.add_source(
            resolve_locator(&entry.locator, &base_dir),
            entry.options(config.index.archive),
        );
    }

    let summary = builder.generate().context("index generation failed")?;

    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(stats) => {
                let origin = if stats.from_cache { " (cached)" } else { "" };
                println!(
                    "  {}: {} packages, {} versions{origin}",
                    outcome.locator, stats.packages, stats.versions
                );
            }
            Err(err) => println!("  {}: failed: {err}", outcome.locator),
        }
    }
    println!("Wrote {}", summary.descriptor_path.display());
    Ok(())
}

/// Local relative locators are resolved against the config file's
/// directory, so builds behave the same from any working directory.
fn resolve_locator(locator: &str, base_dir: &Path) -> String {
    if classify(locator) == LocatorKind::LocalPath && !Path::new(locator).is_absolute() {
        return base_dir.join(locator).display().to_string();
    }
    locator.to_string()
}

pub(crate) fn load_config(
    cwd: &Path,
    config_path: Option<&Path>,
) -> Result<(DepotConfig, PathBuf)> {
    match config_path {
        Some(path) => {
            let config = DepotConfig::load(path)?;
            let base = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(cwd);
            Ok((config, base.to_path_buf()))
        }
        None => match DepotConfig::find_and_load(cwd)? {
            Some(found) => Ok(found),
            None => bail!("no depot.toml found (run `depot init` first)"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) {
        std::fs::write(dir.join("depot.toml"), body).unwrap();
    }

    #[test]
    fn build_generates_index_for_local_source() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("widget");
        std::fs::create_dir(&package).unwrap();
        std::fs::write(
            package.join("depot.json"),
            r#"{"name": "acme/widget", "version": "1.0.0"}"#,
        )
        .unwrap();
        write_config(
            dir.path(),
            "[index]\n\n[[sources]]\nlocator = \"widget\"\n",
        );

        run(dir.path(), None, None, false).unwrap();

        let descriptor = dir.path().join("public/packages.json");
        assert!(descriptor.is_file());
        let parsed: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&descriptor).unwrap()).unwrap();
        assert_eq!(
            parsed["available-package-names"],
            serde_json::json!(["acme/widget"])
        );
        assert!(dir.path().join("public/p/acme$widget.json").is_file());
    }

    #[test]
    fn build_without_sources_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "[index]\n");

        let err = run(dir.path(), None, None, false).unwrap_err();
        assert!(err.to_string().contains("no sources"));
    }

    #[test]
    fn build_without_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        // Guard against a depot.toml above the tempdir being picked up.
        let missing = dir.path().join("nothing-here").join("depot.toml");
        let err = run(dir.path(), Some(&missing), None, false).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }

    #[test]
    fn output_dir_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("widget");
        std::fs::create_dir(&package).unwrap();
        std::fs::write(
            package.join("depot.json"),
            r#"{"name": "a/b", "version": "1.0.0"}"#,
        )
        .unwrap();
        write_config(
            dir.path(),
            "[index]\n\n[[sources]]\nlocator = \"widget\"\n",
        );

        let custom = dir.path().join("elsewhere");
        run(dir.path(), None, Some(&custom), false).unwrap();
        assert!(custom.join("packages.json").is_file());
        assert!(!dir.path().join("public").exists());
    }

    #[test]
    fn relative_locators_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_locator("widget", dir.path());
        assert_eq!(resolved, dir.path().join("widget").display().to_string());

        let remote = resolve_locator("https://github.com/a/b.git", dir.path());
        assert_eq!(remote, "https://github.com/a/b.git");
    }
}

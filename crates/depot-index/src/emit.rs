//! Deterministic emission of the index artifact set.
//!
//! One aggregate descriptor plus, per package, a canonical metadata file
//! and a content-hash-suffixed twin holding identical bytes. All maps are
//! `BTreeMap`s, so for a given aggregate the emitted bytes are stable and
//! regeneration only moves the descriptor's `generated` timestamp.

use std::path::{Path, PathBuf};

use serde::Serialize;

use depot_core::{clock, ContentDigest};
use depot_manifest::{escape_package_name, PackageSet};

use crate::error::Result;

/// File name of the aggregate descriptor.
pub const DESCRIPTOR_FILE: &str = "packages.json";

/// Subdirectory holding per-package metadata files.
pub const PACKAGE_DIR: &str = "p";

/// Where a client finds the canonical metadata file for a package.
pub const METADATA_URL_TEMPLATE: &str = "p/%package%.json";

/// Where a client finds the content-hash-addressed metadata file.
pub const PROVIDER_URL_TEMPLATE: &str = "p/%package%$%hash%.json";

#[derive(Serialize)]
struct Descriptor<'a> {
    packages: &'a PackageSet,
    #[serde(rename = "metadata-url-template")]
    metadata_url_template: &'static str,
    #[serde(rename = "provider-url-template")]
    provider_url_template: &'static str,
    #[serde(rename = "available-package-names")]
    available_package_names: Vec<&'a str>,
    generated: String,
}

/// Writes the index artifact set under an output directory.
#[derive(Debug, Clone)]
pub struct IndexWriter {
    output_dir: PathBuf,
}

impl IndexWriter {
    /// Create a writer rooted at the given output directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        IndexWriter {
            output_dir: output_dir.into(),
        }
    }

    /// Emit the descriptor and all per-package files; returns the
    /// descriptor path.
    pub fn write(&self, packages: &PackageSet) -> Result<PathBuf> {
        let package_dir = self.output_dir.join(PACKAGE_DIR);
        std::fs::create_dir_all(&package_dir)?;

        for (name, versions) in packages {
            let mut inner = serde_json::Map::new();
            inner.insert(name.clone(), serde_json::to_value(versions)?);
            let payload = serde_json::json!({ "packages": inner });
            let bytes = serde_json::to_vec_pretty(&payload)?;

            let escaped = escape_package_name(name);
            let digest = ContentDigest::of_bytes(&bytes);
            write_if_changed(&package_dir.join(format!("{escaped}.json")), &bytes)?;
            write_if_changed(
                &package_dir.join(format!("{escaped}${digest}.json")),
                &bytes,
            )?;
        }

        let descriptor = Descriptor {
            packages,
            metadata_url_template: METADATA_URL_TEMPLATE,
            provider_url_template: PROVIDER_URL_TEMPLATE,
            available_package_names: packages.keys().map(String::as_str).collect(),
            generated: clock::now_rfc3339(),
        };
        let path = self.output_dir.join(DESCRIPTOR_FILE);
        std::fs::write(&path, serde_json::to_vec_pretty(&descriptor)?)?;
        Ok(path)
    }
}

/// Write only if the on-disk content differs; keeps re-emission idempotent.
fn write_if_changed(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if std::fs::read(path).map(|current| current == bytes).unwrap_or(false) {
        return Ok(());
    }
    std::fs::write(path, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_manifest::PackageRecord;

    fn sample_set() -> PackageSet {
        let record = PackageRecord::parse(
            r#"{"name": "acme/widget", "version": "1.0.0", "type": "library"}"#,
        )
        .unwrap();
        let mut set = PackageSet::new();
        set.entry("acme/widget".to_string())
            .or_default()
            .insert("1.0.0".to_string(), record);
        set
    }

    #[test]
    fn writes_descriptor_and_package_pair() {
        let dir = tempfile::tempdir().unwrap();
        let writer = IndexWriter::new(dir.path());

        let descriptor_path = writer.write(&sample_set()).unwrap();
        assert_eq!(descriptor_path, dir.path().join("packages.json"));

        let descriptor: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&descriptor_path).unwrap()).unwrap();
        assert_eq!(
            descriptor["available-package-names"],
            serde_json::json!(["acme/widget"])
        );
        assert_eq!(descriptor["metadata-url-template"], "p/%package%.json");
        assert_eq!(
            descriptor["provider-url-template"],
            "p/%package%$%hash%.json"
        );
        assert!(descriptor["generated"].as_str().unwrap().ends_with('Z'));
        assert!(descriptor["packages"]["acme/widget"]["1.0.0"].is_object());

        let canonical = dir.path().join("p/acme$widget.json");
        assert!(canonical.is_file());
        let bytes = std::fs::read(&canonical).unwrap();
        let digest = ContentDigest::of_bytes(&bytes);
        let hashed = dir.path().join(format!("p/acme$widget${digest}.json"));
        assert_eq!(std::fs::read(&hashed).unwrap(), bytes);

        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            parsed["packages"]["acme/widget"]["1.0.0"]["type"],
            "library"
        );
    }

    #[test]
    fn regeneration_is_byte_identical_for_packages() {
        let dir = tempfile::tempdir().unwrap();
        let writer = IndexWriter::new(dir.path());
        let set = sample_set();

        writer.write(&set).unwrap();
        let canonical = dir.path().join("p/acme$widget.json");
        let first = std::fs::read(&canonical).unwrap();

        writer.write(&set).unwrap();
        let second = std::fs::read(&canonical).unwrap();
        assert_eq!(first, second);

        // Exactly one canonical + one hashed file; no stale twins.
        let count = std::fs::read_dir(dir.path().join("p")).unwrap().count();
        assert_eq!(count, 2);
    }

    #[test]
    fn descriptors_differ_only_in_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let writer = IndexWriter::new(dir.path());
        let set = sample_set();

        let first_path = writer.write(&set).unwrap();
        let mut first: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&first_path).unwrap()).unwrap();
        let second_path = writer.write(&set).unwrap();
        let mut second: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&second_path).unwrap()).unwrap();

        first.as_object_mut().unwrap().remove("generated");
        second.as_object_mut().unwrap().remove("generated");
        assert_eq!(first, second);
    }

    #[test]
    fn empty_aggregate_still_emits_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let writer = IndexWriter::new(dir.path());

        let path = writer.write(&PackageSet::new()).unwrap();
        let descriptor: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(descriptor["available-package-names"], serde_json::json!([]));
    }
}

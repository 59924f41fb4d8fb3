//! `depot init` — project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::DepotConfig;

/// Create a new depot project directory named after the index.
pub fn run(name: &str) -> Result<()> {
    let project_dir = Path::new(name);
    create_project(project_dir, name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }

    fs::create_dir_all(project_dir).context("creating project directory")?;
    fs::write(
        project_dir.join(DepotConfig::FILE_NAME),
        DepotConfig::template(name),
    )
    .context("writing depot.toml")?;
    fs::write(project_dir.join(".gitignore"), "public/\n.depot-cache/\n")
        .context("writing .gitignore")?;

    println!("Created index project '{name}'");
    println!("  {name}/depot.toml");
    println!("  {name}/.gitignore");
    println!("Add sources to depot.toml, then run `depot build`.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_project_structure() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("my-index");

        create_project(&project, "my-index").unwrap();

        assert!(project.join("depot.toml").is_file());
        assert!(project.join(".gitignore").is_file());
    }

    #[test]
    fn init_generates_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("valid");

        create_project(&project, "valid").unwrap();

        let content = std::fs::read_to_string(project.join("depot.toml")).unwrap();
        let config = DepotConfig::parse(&content).unwrap();
        assert_eq!(config.index.name.as_deref(), Some("valid"));
    }

    #[test]
    fn init_refuses_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("existing");
        std::fs::create_dir(&project).unwrap();

        let result = create_project(&project, "existing");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }
}

//! Reads the project's `Cargo.toml`.
//!
//! Only two things are taken from it: `package.name`, which is the default
//! binary name, and the optional `[package.metadata.relpack]` table:
//!
//! ```toml
//! [package.metadata.relpack]
//! bin-name = "repo-rs"
//! release-dir = "deploy"
//! packages = ["libssl-dev", "pkg-config"]
//! lint = true
//! ```
//!
//! Unknown keys are ignored so other tools can share the table.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name looked up in the project directory.
pub const MANIFEST_FILE: &str = "Cargo.toml";

/// The parts of a `Cargo.toml` relpack cares about.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Manifest {
    /// `package.name`, absent for virtual workspace manifests.
    pub package_name: Option<String>,
    pub metadata: RelpackMetadata,
}

/// The `[package.metadata.relpack]` table.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelpackMetadata {
    pub bin_name: Option<String>,
    pub release_dir: Option<PathBuf>,
    #[serde(default)]
    pub packages: Vec<String>,
    pub lint: Option<bool>,
}

#[derive(Deserialize)]
struct RawManifest {
    package: Option<RawPackage>,
}

#[derive(Deserialize)]
struct RawPackage {
    name: Option<String>,
    metadata: Option<RawMetadata>,
}

#[derive(Deserialize)]
struct RawMetadata {
    relpack: Option<RelpackMetadata>,
}

impl Manifest {
    /// Load `Cargo.toml` from a project directory.
    ///
    /// Returns `Ok(None)` when the directory has no manifest; relpack can
    /// still package a binary as long as the name comes from elsewhere.
    pub fn load(project_dir: &Path) -> Result<Option<Self>> {
        let path = project_dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let manifest =
            Self::parse(&content).with_context(|| format!("Invalid manifest {}", path.display()))?;
        Ok(Some(manifest))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawManifest = toml::from_str(content)?;
        let (package_name, metadata) = match raw.package {
            Some(package) => (
                package.name,
                package
                    .metadata
                    .and_then(|m| m.relpack)
                    .unwrap_or_default(),
            ),
            None => (None, RelpackMetadata::default()),
        };
        Ok(Self {
            package_name,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_name() {
        let manifest = Manifest::parse(
            r#"
[package]
name = "repo-rs"
version = "0.1.0"
"#,
        )
        .unwrap();
        assert_eq!(manifest.package_name.as_deref(), Some("repo-rs"));
        assert_eq!(manifest.metadata, RelpackMetadata::default());
    }

    #[test]
    fn test_parse_relpack_metadata() {
        let manifest = Manifest::parse(
            r#"
[package]
name = "repo-rs"
version = "0.1.0"

[package.metadata.relpack]
bin-name = "repo"
release-dir = "deploy"
packages = ["libssl-dev", "cmake"]
lint = true
other-tool-key = "ignored"
"#,
        )
        .unwrap();
        let meta = manifest.metadata;
        assert_eq!(meta.bin_name.as_deref(), Some("repo"));
        assert_eq!(meta.release_dir, Some(PathBuf::from("deploy")));
        assert_eq!(meta.packages, vec!["libssl-dev", "cmake"]);
        assert_eq!(meta.lint, Some(true));
    }

    #[test]
    fn test_workspace_version_is_accepted() {
        let manifest = Manifest::parse(
            r#"
[package]
name = "member"
version.workspace = true
"#,
        )
        .unwrap();
        assert_eq!(manifest.package_name.as_deref(), Some("member"));
    }

    #[test]
    fn test_virtual_manifest_has_no_name() {
        let manifest = Manifest::parse(
            r#"
[workspace]
members = ["a", "b"]
"#,
        )
        .unwrap();
        assert!(manifest.package_name.is_none());
    }

    #[test]
    fn test_wrong_type_is_error() {
        let result = Manifest::parse(
            r#"
[package]
name = "x"

[package.metadata.relpack]
lint = "sometimes"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Manifest::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            "[package]\nname = \"tool\"\nversion = \"1.0.0\"\n",
        )
        .unwrap();
        let manifest = Manifest::load(dir.path()).unwrap().unwrap();
        assert_eq!(manifest.package_name.as_deref(), Some("tool"));
    }
}

//! Pipeline configuration.
//!
//! Every setting is resolved in the same order: command-line flag, then
//! environment variable, then `[package.metadata.relpack]` in the project's
//! `Cargo.toml`, then the built-in default.
//!
//! # Environment Variables
//!
//! - `ENABLE_LINT`: run `cargo fmt --check` and `cargo clippy -D warnings`
//! - `CARGO_FLAGS`: extra flags for build, lint and test
//! - `TARGET`: target triple (defaults to the triple relpack was built for)
//! - `BIN_NAME`: binary to package (defaults to `package.name`)
//! - `RELEASE_DIR`: where the archive and metadata files go
//! - `CARGO`: cargo program to invoke
//! - `CARGO_TARGET_DIR`: cargo's output directory
//! - `DEPS`: OS packages to install before building
//!
//! # Example
//!
//! ```rust,ignore
//! use relpack::config::{Overrides, ReleaseConfig};
//!
//! let config = ReleaseConfig::resolve(Overrides::default())?;
//! println!("{}", config.archive_name("1.2.3"));
//! ```

use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use crate::manifest::Manifest;

pub const ENV_LINT: &str = "ENABLE_LINT";
pub const ENV_CARGO_FLAGS: &str = "CARGO_FLAGS";
pub const ENV_TARGET: &str = "TARGET";
pub const ENV_BIN_NAME: &str = "BIN_NAME";
pub const ENV_RELEASE_DIR: &str = "RELEASE_DIR";
pub const ENV_CARGO: &str = "CARGO";
pub const ENV_TARGET_DIR: &str = "CARGO_TARGET_DIR";
pub const ENV_DEPS: &str = "DEPS";

/// Triple relpack itself was compiled for, exported by `build.rs`.
pub const HOST_TARGET: &str = env!("RELPACK_HOST_TARGET");

pub const DEFAULT_RELEASE_DIR: &str = "release";
pub const DEFAULT_CARGO: &str = "cargo";

/// Side file holding the extracted version.
pub const VERSION_FILE: &str = "version";
/// Side file holding the archive's file name.
pub const ARCHIVE_NAME_FILE: &str = "archive_name";
/// Suffix of the checksum file written next to the archive.
pub const CHECKSUM_SUFFIX: &str = ".sha256";

/// Values given explicitly on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub project_dir: Option<PathBuf>,
    pub bin_name: Option<String>,
    pub target: Option<String>,
    pub lint: Option<bool>,
    pub release_dir: Option<PathBuf>,
    /// Package this file instead of cargo's build output.
    pub binary: Option<PathBuf>,
}

/// Fully resolved configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseConfig {
    pub project_dir: PathBuf,
    pub bin_name: String,
    pub target: String,
    pub lint: bool,
    pub cargo_flags: Vec<String>,
    pub release_dir: PathBuf,
    pub target_dir: PathBuf,
    pub cargo: String,
    pub packages: Vec<String>,
    pub binary_override: Option<PathBuf>,
}

impl ReleaseConfig {
    /// Resolve against the process environment.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        Self::resolve_with(overrides, |key| env::var(key).ok())
    }

    /// Resolve with a custom environment lookup.
    pub fn resolve_with<F>(overrides: Overrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty variables count as unset, the way CI matrices usually pass them.
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cwd = env::current_dir().context("Failed to determine current directory")?;
        let project_dir = absolute(&cwd, overrides.project_dir.unwrap_or_else(|| cwd.clone()));

        let manifest = Manifest::load(&project_dir)?.unwrap_or_default();
        let meta = manifest.metadata;

        let bin_name = match overrides
            .bin_name
            .or_else(|| var(ENV_BIN_NAME))
            .or(meta.bin_name)
            .or(manifest.package_name)
            .or_else(|| stem_of(overrides.binary.as_deref()))
        {
            Some(name) => name,
            None => bail!(
                "Could not determine the binary name.\n\
                 Pass --bin or --binary, set {}, or run inside a cargo package.",
                ENV_BIN_NAME
            ),
        };
        validate_bin_name(&bin_name)?;

        let target = overrides
            .target
            .or_else(|| var(ENV_TARGET))
            .unwrap_or_else(|| HOST_TARGET.to_string());
        validate_target(&target)?;

        let lint = match overrides.lint {
            Some(lint) => lint,
            None => match var(ENV_LINT) {
                Some(value) => parse_flag(&value)
                    .with_context(|| format!("Invalid value for {}", ENV_LINT))?,
                None => meta.lint.unwrap_or(false),
            },
        };

        let cargo_flags = var(ENV_CARGO_FLAGS)
            .map(|flags| split_words(&flags))
            .unwrap_or_default();

        let release_dir = overrides
            .release_dir
            .or_else(|| var(ENV_RELEASE_DIR).map(PathBuf::from))
            .or(meta.release_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RELEASE_DIR));
        let release_dir = absolute(&project_dir, release_dir);

        let target_dir = var(ENV_TARGET_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("target"));
        let target_dir = absolute(&project_dir, target_dir);

        let cargo = var(ENV_CARGO).unwrap_or_else(|| DEFAULT_CARGO.to_string());

        let packages = match var(ENV_DEPS) {
            Some(deps) => split_words(&deps),
            None => meta.packages,
        };

        let binary_override = overrides.binary.map(|path| absolute(&cwd, path));

        Ok(Self {
            project_dir,
            bin_name,
            target,
            lint,
            cargo_flags,
            release_dir,
            target_dir,
            cargo,
            packages,
            binary_override,
        })
    }

    /// File name of the executable for the configured target.
    pub fn executable_name(&self) -> String {
        if self.is_windows_target() {
            format!("{}.exe", self.bin_name)
        } else {
            self.bin_name.clone()
        }
    }

    /// Path of the binary to package.
    pub fn binary_path(&self) -> PathBuf {
        match &self.binary_override {
            Some(path) => path.clone(),
            None => self
                .target_dir
                .join(&self.target)
                .join("release")
                .join(self.executable_name()),
        }
    }

    /// `<binary>-<version>-<target>.tar.gz`
    pub fn archive_name(&self, version: &str) -> String {
        format!("{}-{}-{}.tar.gz", self.bin_name, version, self.target)
    }

    pub fn archive_path(&self, version: &str) -> PathBuf {
        self.release_dir.join(self.archive_name(version))
    }

    pub fn version_file(&self) -> PathBuf {
        self.release_dir.join(VERSION_FILE)
    }

    pub fn archive_name_file(&self) -> PathBuf {
        self.release_dir.join(ARCHIVE_NAME_FILE)
    }

    /// Whether the target differs from the host and needs `rustup target add`.
    pub fn is_cross(&self) -> bool {
        self.target != HOST_TARGET
    }

    fn is_windows_target(&self) -> bool {
        self.target.contains("windows")
    }
}

/// Parse a boolean flag the way CI systems spell them.
pub fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean (1/0, true/false, yes/no, on/off), got '{}'", other),
    }
}

fn split_words(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

fn absolute(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn validate_bin_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        bail!("Invalid binary name '{}': must be a plain file name", name);
    }
    Ok(())
}

/// File name of an explicitly given binary, minus any `.exe`.
fn stem_of(binary: Option<&Path>) -> Option<String> {
    binary?
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

/// The target ends up in the archive's file name, so it must not be a path.
fn validate_target(target: &str) -> Result<()> {
    if target.is_empty() || target.contains('/') || target.contains('\\') || target.starts_with('.') {
        bail!("Invalid target '{}': expected a target triple", target);
    }
    Ok(())
}

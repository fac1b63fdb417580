//! Dependency installation for the release pipeline.
//!
//! The install-deps step prepares the host in three parts, each skipped when
//! it has nothing to do:
//!
//! 1. **OS packages**: installed through the host package manager
//! 2. **Rust components**: `rustfmt` and `clippy` when lint is on
//! 3. **Rust target**: `rustup target add` when cross-compiling
//!
//! # Usage
//!
//! ```rust,ignore
//! use relpack::deps::DependencyInstaller;
//!
//! let installer = DependencyInstaller::new(&config);
//! installer.install_all()?;
//! ```

use anyhow::{bail, Context, Result};

use crate::config::ReleaseConfig;
use crate::output;
use crate::process::{exists, Cmd};

/// Rust components the lint steps rely on.
pub const LINT_COMPONENTS: &[&str] = &["rustfmt", "clippy"];

/// Package managers relpack knows how to drive, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Apk,
    Brew,
}

impl PackageManager {
    const ALL: [PackageManager; 5] = [
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Yum,
        PackageManager::Apk,
        PackageManager::Brew,
    ];

    pub fn program(self) -> &'static str {
        match self {
            PackageManager::Apt => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Apk => "apk",
            PackageManager::Brew => "brew",
        }
    }

    /// Find the first package manager present on `PATH`.
    pub fn detect() -> Option<Self> {
        Self::detect_with(exists)
    }

    pub fn detect_with(available: impl Fn(&str) -> bool) -> Option<Self> {
        Self::ALL.into_iter().find(|pm| available(pm.program()))
    }

    /// Homebrew refuses to run as root; everything else needs it.
    pub fn needs_root(self) -> bool {
        !matches!(self, PackageManager::Brew)
    }

    /// Commands that install `packages`, in order.
    ///
    /// apt needs its index refreshed first on fresh CI images.
    pub fn install_commands(self, packages: &[String]) -> Vec<Vec<String>> {
        let program = self.program().to_string();
        let owned = |args: &[&str]| -> Vec<String> {
            std::iter::once(program.clone())
                .chain(args.iter().map(|a| a.to_string()))
                .chain(packages.iter().cloned())
                .collect()
        };

        match self {
            PackageManager::Apt => vec![
                vec![program.clone(), "update".into(), "-qq".into()],
                owned(&["install", "-y", "--no-install-recommends"]),
            ],
            PackageManager::Dnf | PackageManager::Yum => vec![owned(&["install", "-y"])],
            PackageManager::Apk => vec![owned(&["add", "--no-cache"])],
            PackageManager::Brew => vec![owned(&["install"])],
        }
    }
}

/// Installs everything the configured pipeline needs.
pub struct DependencyInstaller<'a> {
    config: &'a ReleaseConfig,
}

impl<'a> DependencyInstaller<'a> {
    pub fn new(config: &'a ReleaseConfig) -> Self {
        Self { config }
    }

    /// Run every install sub-step. Returns how many of them did work.
    pub fn install_all(&self) -> Result<usize> {
        let mut performed = 0;

        if self.install_packages()? {
            performed += 1;
        }
        if self.install_components()? {
            performed += 1;
        }
        if self.install_target()? {
            performed += 1;
        }

        Ok(performed)
    }

    /// Install OS packages. Returns `false` when none are configured.
    pub fn install_packages(&self) -> Result<bool> {
        let packages = &self.config.packages;
        if packages.is_empty() {
            output::detail("No OS packages configured");
            return Ok(false);
        }

        let Some(pm) = PackageManager::detect() else {
            bail!(
                "No supported package manager found (looked for: {}).\n\
                 Install these packages manually: {}",
                PackageManager::ALL
                    .iter()
                    .map(|pm| pm.program())
                    .collect::<Vec<_>>()
                    .join(", "),
                packages.join(" ")
            );
        };

        let escalate = pm.needs_root() && !is_root()? && exists("sudo");
        output::detail(&format!(
            "Installing {} package(s) with {}: {}",
            packages.len(),
            pm.program(),
            packages.join(" ")
        ));

        for argv in pm.install_commands(packages) {
            let cmd = if escalate {
                Cmd::new("sudo").args(&argv)
            } else {
                Cmd::new(&argv[0]).args(&argv[1..])
            };
            cmd.env("DEBIAN_FRONTEND", "noninteractive")
                .error_msg(format!("{} failed", argv.join(" ")))
                .run_interactive()?;
        }

        Ok(true)
    }

    /// Add lint components. Returns `false` when lint is off.
    pub fn install_components(&self) -> Result<bool> {
        if !self.config.lint {
            return Ok(false);
        }
        Cmd::new("rustup")
            .args(["component", "add"])
            .args(LINT_COMPONENTS)
            .error_msg("Failed to install rustfmt/clippy components")
            .run_interactive()?;
        Ok(true)
    }

    /// Add the rustup target. Returns `false` for native builds.
    pub fn install_target(&self) -> Result<bool> {
        if !self.config.is_cross() {
            return Ok(false);
        }
        Cmd::new("rustup")
            .args(["target", "add"])
            .arg(&self.config.target)
            .error_msg(format!("Failed to add rust target {}", self.config.target))
            .run_interactive()?;
        Ok(true)
    }
}

/// Whether the current user is root, as reported by `id -u`.
fn is_root() -> Result<bool> {
    let result = Cmd::new("id")
        .arg("-u")
        .run()
        .context("Failed to determine current user")?;
    Ok(result.stdout.trim() == "0")
}

//! Preflight checks for release pipeline prerequisites.
//!
//! This module validates that all prerequisites are met BEFORE starting
//! expensive operations like installing packages or compiling.
//!
//! # Checks Performed
//!
//! - **Host tools**: cargo, rustc, rustup (when needed), rustfmt and clippy
//!   (when lint is on)
//! - **Disk space**: Room for a release build in the project directory
//! - **Network**: The crates.io index is reachable
//! - **Artifact status**: Reports what is already built and released
//!
//! # Usage
//!
//! ```rust,ignore
//! use relpack::preflight::PreflightChecker;
//!
//! let checker = PreflightChecker::new(&config);
//! let report = checker.run_all().await;
//!
//! if !report.is_ok() {
//!     for error in report.errors() {
//!         eprintln!("  - {}", error.message);
//!     }
//!     std::process::exit(1);
//! }
//! ```

mod disk_space;
mod host_tools;
mod network;

pub use disk_space::check_disk_space;
pub use host_tools::{check_host_tools, check_required_tools};
pub use network::check_network;

use anyhow::{bail, Result};

use crate::config::ReleaseConfig;

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
    /// Optional suggestion for fixing the issue
    pub suggestion: Option<String>,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Create a failing check result.
    pub fn fail(
        name: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create a warning check result (passes but with a note).
    pub fn warn(
        name: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

/// Comprehensive preflight report.
#[derive(Debug, Default)]
pub struct PreflightReport {
    /// All check results
    pub checks: Vec<CheckResult>,
    /// What already exists on disk
    pub artifact_status: ArtifactStatus,
}

impl PreflightReport {
    /// Check if all preflight checks passed.
    pub fn is_ok(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Get all failing checks.
    pub fn errors(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    /// Get count of passing checks.
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Get total check count.
    pub fn total_count(&self) -> usize {
        self.checks.len()
    }

    /// Turn a failed report into an error listing every failing check.
    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            return Ok(());
        }
        let lines: Vec<String> = self
            .errors()
            .iter()
            .map(|c| match &c.suggestion {
                Some(s) => format!("{}: {} ({})", c.name, c.message, s),
                None => format!("{}: {}", c.name, c.message),
            })
            .collect();
        bail!("Preflight checks failed:\n  {}", lines.join("\n  "));
    }

    /// Print a summary of the preflight checks.
    pub fn print_summary(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let status = if check.passed { "[OK]" } else { "[FAIL]" };
            println!("{} {}: {}", status, check.name, check.message);
            if let Some(suggestion) = &check.suggestion {
                println!("     Suggestion: {}", suggestion);
            }
        }

        println!();
        println!("=== Artifact Status ===\n");
        self.artifact_status.print();

        println!();
        if self.is_ok() {
            println!(
                "All preflight checks passed ({}/{})",
                self.passed_count(),
                self.total_count()
            );
        } else {
            println!(
                "Preflight checks failed: {} of {} passed",
                self.passed_count(),
                self.total_count()
            );
        }
    }
}

/// What the previous runs left behind.
#[derive(Debug, Default)]
pub struct ArtifactStatus {
    /// Release binary exists for the configured target
    pub has_binary: bool,
    /// Version file from a completed release
    pub released_version: Option<String>,
    /// Archive-name file from a completed release
    pub released_archive: Option<String>,
}

impl ArtifactStatus {
    /// Print artifact status.
    pub fn print(&self) {
        let status = |b: bool| if b { "[built]" } else { "[missing]" };

        println!("{}  Release binary", status(self.has_binary));
        match (&self.released_version, &self.released_archive) {
            (Some(version), Some(archive)) => {
                println!("[released]  {} ({})", archive, version)
            }
            _ => println!("[missing]  Release archive"),
        }
    }
}

/// Preflight checker for release pipeline prerequisites.
pub struct PreflightChecker<'a> {
    config: &'a ReleaseConfig,
}

impl<'a> PreflightChecker<'a> {
    /// Create a new preflight checker.
    pub fn new(config: &'a ReleaseConfig) -> Self {
        Self { config }
    }

    /// Run all preflight checks and return a comprehensive report.
    pub async fn run_all(&self) -> PreflightReport {
        let mut report = PreflightReport::default();

        // Check host tools
        report.checks.extend(check_host_tools(self.config));

        // Check disk space
        report.checks.push(check_disk_space(&self.config.project_dir));

        // Check network (async)
        report.checks.push(check_network().await);

        report.artifact_status = self.check_artifact_status();

        report
    }

    /// Check what's already built.
    fn check_artifact_status(&self) -> ArtifactStatus {
        let read = |path: std::path::PathBuf| {
            std::fs::read_to_string(path)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        ArtifactStatus {
            has_binary: self.config.binary_path().is_file(),
            released_version: read(self.config.version_file()),
            released_archive: read(self.config.archive_name_file()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_pass() {
        let result = CheckResult::pass("test", "passed");
        assert!(result.passed);
        assert!(result.suggestion.is_none());
    }

    #[test]
    fn test_check_result_fail() {
        let result = CheckResult::fail("test", "failed", "fix it");
        assert!(!result.passed);
        assert!(result.suggestion.is_some());
    }

    #[test]
    fn test_check_result_warn_passes() {
        let result = CheckResult::warn("test", "odd", "look at it");
        assert!(result.passed);
        assert_eq!(result.suggestion.as_deref(), Some("look at it"));
    }

    #[test]
    fn test_preflight_report_is_ok() {
        let mut report = PreflightReport::default();
        assert!(report.is_ok()); // Empty is OK

        report.checks.push(CheckResult::pass("test1", "ok"));
        assert!(report.is_ok());

        report.checks.push(CheckResult::fail("test2", "bad", "fix"));
        assert!(!report.is_ok());
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.total_count(), 2);
    }

    #[test]
    fn test_into_result_lists_failures() {
        let mut report = PreflightReport::default();
        report.checks.push(CheckResult::pass("cargo tool", "found"));
        report
            .checks
            .push(CheckResult::fail("rustup tool", "Not found", "install rustup"));

        let err = report.into_result().unwrap_err().to_string();
        assert!(err.contains("rustup tool: Not found (install rustup)"));
        assert!(!err.contains("cargo tool"));
    }
}

//! Host tool validation for the release pipeline.
//!
//! Checks that required external tools are installed and executable.

use super::CheckResult;
use crate::config::ReleaseConfig;
use crate::process::which;

const RUSTUP_INSTALL: &str = "Install rustup from https://rustup.rs";

/// Tools the pipeline invokes before anything can install them.
///
/// `rustfmt` and `clippy` are not listed: the install-deps step adds them
/// through rustup when lint is on.
pub fn required_tools(config: &ReleaseConfig) -> Vec<(String, &'static str, &'static str)> {
    let mut tools = vec![
        (config.cargo.clone(), "Build, lint and test", RUSTUP_INSTALL),
        ("rustc".to_string(), "Compile the binary", RUSTUP_INSTALL),
    ];
    if config.lint || config.is_cross() {
        tools.push((
            "rustup".to_string(),
            "Install rust components and targets",
            RUSTUP_INSTALL,
        ));
    }
    tools
}

/// Check only the tools a pipeline run cannot do without.
pub fn check_required_tools(config: &ReleaseConfig) -> Vec<CheckResult> {
    required_tools(config)
        .iter()
        .map(|(tool, purpose, install)| check_tool(tool, purpose, install))
        .collect()
}

/// Check required tools plus the lint components.
///
/// Missing lint components only warn, since install-deps can add them.
pub fn check_host_tools(config: &ReleaseConfig) -> Vec<CheckResult> {
    let mut results = check_required_tools(config);
    if config.lint {
        for (tool, component) in [("rustfmt", "rustfmt"), ("cargo-clippy", "clippy")] {
            results.push(match which(tool) {
                Some(path) => CheckResult::pass(format!("{} tool", tool), format!("Found at {}", path)),
                None => CheckResult::warn(
                    format!("{} tool", tool),
                    "Not found (installed by the install-deps step)",
                    format!("rustup component add {}", component),
                ),
            });
        }
    }
    results
}

/// Check a single tool.
fn check_tool(tool: &str, purpose: &str, install_cmd: &str) -> CheckResult {
    match which(tool) {
        Some(path) => CheckResult::pass(
            format!("{} tool", tool),
            format!("Found at {} ({})", path, purpose),
        ),
        None => CheckResult::fail(
            format!("{} tool", tool),
            format!("Not found (needed for: {})", purpose),
            install_cmd,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Overrides, HOST_TARGET};

    fn config(lint: bool, target: &str) -> ReleaseConfig {
        let dir = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            project_dir: Some(dir.path().to_path_buf()),
            bin_name: Some("tool".into()),
            target: Some(target.into()),
            lint: Some(lint),
            ..Default::default()
        };
        ReleaseConfig::resolve_with(overrides, |_| None).unwrap()
    }

    #[test]
    fn test_rustup_only_when_needed() {
        let native = required_tools(&config(false, HOST_TARGET));
        assert!(!native.iter().any(|(t, _, _)| t == "rustup"));

        let linted = required_tools(&config(true, HOST_TARGET));
        assert!(linted.iter().any(|(t, _, _)| t == "rustup"));

        let cross = required_tools(&config(false, "riscv64gc-unknown-none-elf"));
        assert!(cross.iter().any(|(t, _, _)| t == "rustup"));
    }

    #[test]
    fn test_missing_cargo_fails() {
        let mut cfg = config(false, HOST_TARGET);
        cfg.cargo = "definitely_not_a_real_command_12345".into();
        let results = check_required_tools(&cfg);
        assert!(!results[0].passed);
        assert!(results[0].suggestion.is_some());
    }

    #[test]
    fn test_lint_components_never_fail() {
        let results = check_host_tools(&config(true, HOST_TARGET));
        let lint: Vec<_> = results
            .iter()
            .filter(|r| r.name.starts_with("rustfmt") || r.name.starts_with("cargo-clippy"))
            .collect();
        assert_eq!(lint.len(), 2);
        assert!(lint.iter().all(|r| r.passed));
    }
}

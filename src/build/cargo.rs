//! Cargo invocations for the format-check, lint, build and test steps.
//!
//! Every command runs in the project directory with stdio inherited, so
//! compiler diagnostics reach the CI log unchanged. Extra `CARGO_FLAGS` go
//! before any `--` separator.

use anyhow::Result;

use crate::config::ReleaseConfig;
use crate::process::Cmd;

/// `cargo fmt --all -- --check`
pub fn fmt_check_cmd(config: &ReleaseConfig) -> Cmd {
    Cmd::new(&config.cargo)
        .args(["fmt", "--all", "--", "--check"])
        .dir(&config.project_dir)
        .error_msg("Formatting check failed, run `cargo fmt --all`")
}

/// `cargo clippy --all-targets --target T <flags> -- -D warnings`
pub fn clippy_cmd(config: &ReleaseConfig) -> Cmd {
    Cmd::new(&config.cargo)
        .args(["clippy", "--all-targets", "--target"])
        .arg(&config.target)
        .args(&config.cargo_flags)
        .args(["--", "-D", "warnings"])
        .dir(&config.project_dir)
        .env("CARGO_TARGET_DIR", &config.target_dir)
        .error_msg("Clippy reported warnings (treated as errors)")
}

/// `cargo build --release --target T <flags>`
pub fn build_cmd(config: &ReleaseConfig) -> Cmd {
    Cmd::new(&config.cargo)
        .args(["build", "--release", "--target"])
        .arg(&config.target)
        .args(&config.cargo_flags)
        .dir(&config.project_dir)
        .env("CARGO_TARGET_DIR", &config.target_dir)
        .error_msg(format!("Build failed for target {}", config.target))
}

/// `cargo test --release --target T <flags>`
pub fn test_cmd(config: &ReleaseConfig) -> Cmd {
    Cmd::new(&config.cargo)
        .args(["test", "--release", "--target"])
        .arg(&config.target)
        .args(&config.cargo_flags)
        .dir(&config.project_dir)
        .env("CARGO_TARGET_DIR", &config.target_dir)
        .error_msg(format!("Tests failed for target {}", config.target))
}

pub fn fmt_check(config: &ReleaseConfig) -> Result<()> {
    fmt_check_cmd(config).run_interactive()?;
    Ok(())
}

pub fn clippy(config: &ReleaseConfig) -> Result<()> {
    clippy_cmd(config).run_interactive()?;
    Ok(())
}

pub fn build(config: &ReleaseConfig) -> Result<()> {
    build_cmd(config).run_interactive()?;
    Ok(())
}

pub fn test(config: &ReleaseConfig) -> Result<()> {
    test_cmd(config).run_interactive()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;

    fn config(flags: &[&str]) -> ReleaseConfig {
        let dir = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            project_dir: Some(dir.path().to_path_buf()),
            bin_name: Some("tool".into()),
            target: Some("x86_64-unknown-linux-musl".into()),
            ..Default::default()
        };
        let flags = flags.join(" ");
        ReleaseConfig::resolve_with(overrides, |key| {
            (key == crate::config::ENV_CARGO_FLAGS).then(|| flags.clone())
        })
        .unwrap()
    }

    #[test]
    fn test_fmt_check_cmd() {
        assert_eq!(
            fmt_check_cmd(&config(&[])).to_string(),
            "cargo fmt --all -- --check"
        );
    }

    #[test]
    fn test_clippy_denies_warnings_after_flags() {
        let cmd = clippy_cmd(&config(&["--locked"])).to_string();
        assert_eq!(
            cmd,
            "cargo clippy --all-targets --target x86_64-unknown-linux-musl --locked -- -D warnings"
        );
    }

    #[test]
    fn test_build_and_test_cmds() {
        let cfg = config(&["--features", "vendored"]);
        assert_eq!(
            build_cmd(&cfg).to_string(),
            "cargo build --release --target x86_64-unknown-linux-musl --features vendored"
        );
        assert_eq!(
            test_cmd(&cfg).to_string(),
            "cargo test --release --target x86_64-unknown-linux-musl --features vendored"
        );
    }

    #[test]
    fn test_failing_cargo_is_error() {
        let mut cfg = config(&[]);
        cfg.cargo = "false".into();
        cfg.project_dir = std::env::temp_dir();
        let err = build(&cfg).unwrap_err();
        assert!(err.to_string().contains("Build failed"));
    }
}

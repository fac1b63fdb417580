//! Version extraction from a built binary.
//!
//! The binary is asked for `--version` and the second whitespace-delimited
//! token of its stdout is the version, so `repo-rs 0.3.1` yields `0.3.1`.
//! The token is kept verbatim (a leading `v` survives) but must parse as
//! semver once that `v` is stripped.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::process::Cmd;

/// Run `<binary> --version` and extract the version token.
pub fn extract_version(binary: &Path) -> Result<String> {
    if !binary.is_file() {
        bail!(
            "Binary not found at {}.\n\
             Run the build step first.",
            binary.display()
        );
    }

    let result = Cmd::new(binary)
        .arg("--version")
        .error_msg(format!("`{} --version` failed", binary.display()))
        .run()?;

    parse_version_output(&result.stdout)
        .with_context(|| format!("Unusable --version output from {}", binary.display()))
}

/// Second whitespace-delimited token of `--version` output.
pub fn parse_version_output(stdout: &str) -> Result<String> {
    let mut tokens = stdout.split_whitespace();
    let Some(_name) = tokens.next() else {
        bail!("--version printed nothing");
    };
    let Some(version) = tokens.next() else {
        bail!("--version output has no version token: '{}'", stdout.trim());
    };

    semver::Version::parse(normalize_version_tag(version))
        .with_context(|| format!("'{}' is not a semantic version", version))?;

    Ok(version.to_string())
}

/// Strips an optional leading `v` or `V` from a version tag.
pub fn normalize_version_tag(tag: &str) -> &str {
    let trimmed = tag.trim();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_token() {
        assert_eq!(parse_version_output("repo-rs 0.3.1\n").unwrap(), "0.3.1");
    }

    #[test]
    fn test_extra_tokens_ignored() {
        let out = "rustc 1.75.0 (82e1608df 2023-12-21)\n";
        assert_eq!(parse_version_output(out).unwrap(), "1.75.0");
    }

    #[test]
    fn test_prerelease_and_build_metadata() {
        assert_eq!(
            parse_version_output("tool 1.0.0-beta.4+abc\n").unwrap(),
            "1.0.0-beta.4+abc"
        );
    }

    #[test]
    fn test_leading_v_is_kept() {
        assert_eq!(parse_version_output("tool v2.1.0").unwrap(), "v2.1.0");
    }

    #[test]
    fn test_empty_output_is_error() {
        assert!(parse_version_output("").is_err());
        assert!(parse_version_output("  \n").is_err());
    }

    #[test]
    fn test_missing_token_is_error() {
        let err = parse_version_output("tool\n").unwrap_err();
        assert!(err.to_string().contains("no version token"));
    }

    #[test]
    fn test_non_semver_is_error() {
        assert!(parse_version_output("tool unknown").is_err());
        assert!(parse_version_output("tool 1.2").is_err());
    }

    #[test]
    fn test_normalize_version_tag() {
        assert_eq!(normalize_version_tag("v0.3.0"), "0.3.0");
        assert_eq!(normalize_version_tag("V1.0.0"), "1.0.0");
        assert_eq!(normalize_version_tag(" 1.0.0 "), "1.0.0");
    }

    #[test]
    fn test_missing_binary_is_error() {
        let err = extract_version(Path::new("/nonexistent/relpack-bin")).unwrap_err();
        assert!(err.to_string().contains("Binary not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_from_script() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("tool");
        std::fs::write(&bin, "#!/bin/sh\necho \"tool 4.5.6\"\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(extract_version(&bin).unwrap(), "4.5.6");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_binary_is_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("tool");
        std::fs::write(&bin, "#!/bin/sh\necho \"tool 4.5.6\"\nexit 3\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = extract_version(&bin).unwrap_err();
        assert!(err.to_string().contains("exit code 3"));
    }
}

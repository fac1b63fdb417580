//! Network connectivity check.
//!
//! Verifies that the crates.io index is reachable before cargo tries to
//! fetch dependencies.

use std::time::Duration;

use super::CheckResult;

/// Sparse index config file, small and always present.
const CRATES_INDEX_URL: &str = "https://index.crates.io/config.json";

const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// Check network connectivity to the crates.io index.
///
/// Performs a HEAD request through curl so no HTTP client is linked in.
pub async fn check_network() -> CheckResult {
    let probe = tokio::process::Command::new("curl")
        .args([
            "--head",           // HEAD request only
            "--silent",         // No progress output
            "--fail",           // Fail on HTTP errors
            "--max-time", "10", // 10 second timeout
            "--output", "/dev/null",
            CRATES_INDEX_URL,
        ])
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(PROBE_TIMEOUT, probe).await {
        Ok(Ok(output)) if output.status.success() => CheckResult::pass(
            "Network",
            format!("crates.io index reachable ({})", index_host()),
        ),
        Ok(Ok(_)) => CheckResult::fail(
            "Network",
            format!("crates.io index unreachable ({})", index_host()),
            "Check your internet connection, or vendor dependencies and build with --offline",
        ),
        Ok(Err(e)) => CheckResult::fail(
            "Network",
            format!("Failed to check network: {}", e),
            "Ensure curl is installed and you have network access",
        ),
        Err(_) => CheckResult::fail(
            "Network",
            format!("Timed out reaching {}", index_host()),
            "Check your internet connection or proxy settings",
        ),
    }
}

/// Extract just the host from the index URL for display.
fn index_host() -> &'static str {
    CRATES_INDEX_URL
        .trim_start_matches("https://")
        .split('/')
        .next()
        .unwrap_or(CRATES_INDEX_URL)
}

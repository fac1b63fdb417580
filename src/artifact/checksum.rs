//! SHA-256 side file for the release archive.
//!
//! Written in GNU coreutils format (`<hash>  <filename>`) so that
//! `sha256sum -c` can verify a downloaded archive.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Computes the SHA256 digest of a file and returns it as a lowercase hex string.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open file for checksum: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("Failed to read file for checksum: {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// One `sha256sum` line, newline-terminated.
pub fn checksum_line(hash: &str, filename: &str) -> String {
    format!("{hash}  {filename}\n")
}

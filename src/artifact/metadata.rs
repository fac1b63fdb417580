//! Plain-text side files recording a finished release.
//!
//! Downstream CI steps (upload, tagging) read these instead of re-deriving
//! the version or the archive name:
//!
//! - `version`: the extracted version, no trailing newline
//! - `archive_name`: the archive's file name, no trailing newline
//! - `<archive>.sha256`: `sha256sum` line for the archive
//!
//! The version and archive-name files are the success marker of a release
//! run, so they are written last, each through a work file and a rename.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::archive::work_path;
use super::checksum::{checksum_line, sha256_file};
use crate::config::{ReleaseConfig, CHECKSUM_SUFFIX};

/// Files written by [`write_metadata`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseMetadata {
    pub version_file: PathBuf,
    pub archive_name_file: PathBuf,
    pub checksum_file: PathBuf,
}

/// Remove the success markers left by an earlier run.
pub fn clear_metadata(config: &ReleaseConfig) -> Result<()> {
    for path in [config.version_file(), config.archive_name_file()] {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to remove stale {}", path.display()))
            }
        }
    }
    Ok(())
}

/// Write the checksum, version and archive-name files for `archive`.
pub fn write_metadata(
    config: &ReleaseConfig,
    version: &str,
    archive: &Path,
) -> Result<ReleaseMetadata> {
    let archive_name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Archive path has no file name: {}", archive.display()))?
        .to_string();

    fs::create_dir_all(&config.release_dir)
        .with_context(|| format!("Failed to create {}", config.release_dir.display()))?;

    let hash = sha256_file(archive)?;
    let checksum_file = checksum_path(archive);
    write_atomic(&checksum_file, &checksum_line(&hash, &archive_name))?;

    let version_file = config.version_file();
    write_atomic(&version_file, version)?;

    let archive_name_file = config.archive_name_file();
    write_atomic(&archive_name_file, &archive_name)?;

    Ok(ReleaseMetadata {
        version_file,
        archive_name_file,
        checksum_file,
    })
}

/// `<archive>.sha256`
pub fn checksum_path(archive: &Path) -> PathBuf {
    let mut name = archive.as_os_str().to_os_string();
    name.push(CHECKSUM_SUFFIX);
    PathBuf::from(name)
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let work = work_path(path);
    fs::write(&work, content).with_context(|| format!("Failed to write {}", work.display()))?;
    if let Err(e) = fs::rename(&work, path) {
        let _ = fs::remove_file(&work);
        return Err(e).with_context(|| format!("Failed to move {} into place", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;

    fn config(dir: &Path) -> ReleaseConfig {
        let overrides = Overrides {
            project_dir: Some(dir.to_path_buf()),
            bin_name: Some("tool".into()),
            target: Some("x86_64-unknown-linux-gnu".into()),
            ..Default::default()
        };
        ReleaseConfig::resolve_with(overrides, |_| None).unwrap()
    }

    #[test]
    fn test_write_metadata_contents() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        fs::create_dir_all(&cfg.release_dir).unwrap();
        let archive = cfg.archive_path("1.2.3");
        fs::write(&archive, b"archive bytes").unwrap();

        let meta = write_metadata(&cfg, "1.2.3", &archive).unwrap();

        assert_eq!(fs::read_to_string(&meta.version_file).unwrap(), "1.2.3");
        assert_eq!(
            fs::read_to_string(&meta.archive_name_file).unwrap(),
            "tool-1.2.3-x86_64-unknown-linux-gnu.tar.gz"
        );
        let line = fs::read_to_string(&meta.checksum_file).unwrap();
        assert!(line.ends_with("  tool-1.2.3-x86_64-unknown-linux-gnu.tar.gz\n"));
        assert!(!work_path(&meta.version_file).exists());
    }

    #[test]
    fn test_clear_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        fs::create_dir_all(&cfg.release_dir).unwrap();
        fs::write(cfg.version_file(), "0.0.1").unwrap();
        fs::write(cfg.archive_name_file(), "old.tar.gz").unwrap();

        clear_metadata(&cfg).unwrap();
        assert!(!cfg.version_file().exists());
        assert!(!cfg.archive_name_file().exists());

        // Nothing to clear is fine too.
        clear_metadata(&cfg).unwrap();
    }

    #[test]
    fn test_missing_archive_writes_no_markers() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let archive = cfg.archive_path("1.2.3");

        assert!(write_metadata(&cfg, "1.2.3", &archive).is_err());
        assert!(!cfg.version_file().exists());
        assert!(!cfg.archive_name_file().exists());
    }

    #[test]
    fn test_checksum_path() {
        assert_eq!(
            checksum_path(Path::new("/r/t-1-x.tar.gz")),
            PathBuf::from("/r/t-1-x.tar.gz.sha256")
        );
    }
}

//! Release tarball builder.
//!
//! The archive holds exactly one entry: the executable, stored at the top
//! level under its file name with mode 0755.
//!
//! # Atomicity
//!
//! The tarball is written to `<name>.work` and renamed into place only after
//! it was finished, synced and verified. If anything fails the work file is
//! removed, so a file under the final name is always complete.

use anyhow::{bail, Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Suffix for in-progress files.
pub const WORK_SUFFIX: &str = ".work";

/// Mode recorded for the executable inside the archive.
const EXECUTABLE_MODE: u32 = 0o755;

/// Build `dest` containing `binary` under `entry_name`.
pub fn create_archive(binary: &Path, entry_name: &str, dest: &Path) -> Result<()> {
    if !binary.is_file() {
        bail!("Binary not found at {}", binary.display());
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let work = work_path(dest);
    let _ = fs::remove_file(&work);

    let build_result = (|| -> Result<()> {
        write_tar_gz(binary, entry_name, &work)?;
        verify_archive(&work, entry_name)?;
        Ok(())
    })();

    if let Err(e) = build_result {
        let _ = fs::remove_file(&work);
        return Err(e);
    }

    fs::rename(&work, dest).with_context(|| {
        format!(
            "Failed to move {} to {}",
            work.display(),
            dest.display()
        )
    })?;

    Ok(())
}

/// `<dest>.work`
pub fn work_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(WORK_SUFFIX);
    PathBuf::from(name)
}

fn write_tar_gz(binary: &Path, entry_name: &str, out: &Path) -> Result<()> {
    let source = File::open(binary)
        .with_context(|| format!("Failed to open binary: {}", binary.display()))?;
    let meta = source
        .metadata()
        .with_context(|| format!("Failed to stat binary: {}", binary.display()))?;
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let file = File::create(out)
        .with_context(|| format!("Failed to create archive: {}", out.display()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut tar_builder = tar::Builder::new(encoder);

    let mut header = tar::Header::new_gnu();
    header.set_size(meta.len());
    header.set_mode(EXECUTABLE_MODE);
    header.set_mtime(mtime);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_cksum();
    tar_builder
        .append_data(&mut header, entry_name, source)
        .with_context(|| format!("Failed to add {} to archive", entry_name))?;

    let encoder = tar_builder
        .into_inner()
        .context("Failed to finish tar stream")?;
    let file = encoder.finish().context("Failed to finish gzip stream")?;
    file.sync_all()
        .with_context(|| format!("Failed to sync {}", out.display()))?;

    Ok(())
}

/// Names of all entries in a `.tar.gz`.
pub fn list_entries(archive: &Path) -> Result<Vec<String>> {
    let file = File::open(archive)
        .with_context(|| format!("Failed to open archive: {}", archive.display()))?;
    let decoder = flate2::read::GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);

    let mut names = Vec::new();
    for entry in archive.entries().context("Failed to read tar entries")? {
        let entry = entry.context("Failed to read tar entry")?;
        let path = entry.path().context("Failed to read tar entry path")?;
        names.push(path.to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Verify the archive holds exactly the expected entry.
fn verify_archive(archive: &Path, entry_name: &str) -> Result<()> {
    let entries = list_entries(archive)?;
    if entries.len() != 1 || entries[0] != entry_name {
        bail!(
            "Archive verification FAILED: expected only '{}', found [{}]",
            entry_name,
            entries.join(", ")
        );
    }
    Ok(())
}

//! State carried from one step to the next.

use std::fs;
use std::path::PathBuf;

use crate::artifact::ReleaseMetadata;
use crate::config::ReleaseConfig;

/// Shared context for one pipeline run.
///
/// Packaging steps record what they produced here; if a later step fails,
/// the executor deletes those files via [`ReleaseContext::discard_outputs`].
#[derive(Debug)]
pub struct ReleaseContext {
    pub config: ReleaseConfig,
    /// Set by extract-version.
    pub version: Option<String>,
    /// Set by archive.
    pub archive: Option<PathBuf>,
    /// Set by write-metadata.
    pub metadata: Option<ReleaseMetadata>,
    produced: Vec<PathBuf>,
}

impl ReleaseContext {
    pub fn new(config: ReleaseConfig) -> Self {
        Self {
            config,
            version: None,
            archive: None,
            metadata: None,
            produced: Vec::new(),
        }
    }

    /// Remember a file written by this run.
    pub fn record_output(&mut self, path: PathBuf) {
        self.produced.push(path);
    }

    pub fn outputs(&self) -> &[PathBuf] {
        &self.produced
    }

    /// Delete everything this run wrote, newest first.
    pub fn discard_outputs(&mut self) {
        for path in self.produced.drain(..).rev() {
            let _ = fs::remove_file(&path);
        }
        self.archive = None;
        self.metadata = None;
    }
}

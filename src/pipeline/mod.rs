//! Release pipeline steps.
//!
//! A pipeline is a fixed, ordered list of [`Step`]s run one after another
//! over a [`ReleaseContext`]. The first failing step stops the run; nothing
//! after it executes.
//!
//! ```text
//! install-deps → format-check → lint → build → test      (ci)
//!              → extract-version → archive → write-metadata (release)
//! ```

pub mod context;
pub mod definitions;
pub mod executor;

pub use context::ReleaseContext;
pub use definitions::{CI_STEPS, PACKAGE_STEPS, RELEASE_STEPS};
pub use executor::{run, RunSummary};

use std::fmt;

/// One unit of pipeline work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// OS packages, rust components and targets
    InstallDeps,
    /// `cargo fmt --check`, only when lint is on
    FormatCheck,
    /// `cargo clippy -D warnings`, only when lint is on
    Lint,
    /// `cargo build --release`
    Build,
    /// `cargo test --release`
    Test,
    /// Second token of `<binary> --version`
    ExtractVersion,
    /// `<bin>-<version>-<target>.tar.gz`
    Archive,
    /// Version, archive-name and checksum side files
    WriteMetadata,
}

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Step::InstallDeps => "install-deps",
            Step::FormatCheck => "format-check",
            Step::Lint => "lint",
            Step::Build => "build",
            Step::Test => "test",
            Step::ExtractVersion => "extract-version",
            Step::Archive => "archive",
            Step::WriteMetadata => "write-metadata",
        }
    }

    /// Whether the step produces release artifacts.
    pub fn is_packaging(self) -> bool {
        matches!(
            self,
            Step::ExtractVersion | Step::Archive | Step::WriteMetadata
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Skipped { reason: String },
}

impl StepOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        StepOutcome::Skipped {
            reason: reason.into(),
        }
    }
}

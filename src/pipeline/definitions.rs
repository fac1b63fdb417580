//! The pipelines relpack knows how to run.

use super::Step;

/// Install, lint (when enabled), build and test.
pub static CI_STEPS: &[Step] = &[
    Step::InstallDeps,
    Step::FormatCheck,
    Step::Lint,
    Step::Build,
    Step::Test,
];

/// Everything in [`CI_STEPS`], then package the result.
pub static RELEASE_STEPS: &[Step] = &[
    Step::InstallDeps,
    Step::FormatCheck,
    Step::Lint,
    Step::Build,
    Step::Test,
    Step::ExtractVersion,
    Step::Archive,
    Step::WriteMetadata,
];

/// Package an already built binary.
pub static PACKAGE_STEPS: &[Step] = &[Step::ExtractVersion, Step::Archive, Step::WriteMetadata];

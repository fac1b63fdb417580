//! Pipeline executor - runs steps in order and stops at the first failure.
//!
//! This is the single place where steps are mapped to the work they do.
//! A failure discards every artifact this run produced, so the release
//! directory never holds a half-finished release.

use anyhow::{bail, Context, Result};
use std::time::{Duration, Instant};

use super::context::ReleaseContext;
use super::{Step, StepOutcome};
use crate::artifact::{self, metadata::checksum_path};
use crate::deps::DependencyInstaller;
use crate::preflight::{check_required_tools, PreflightReport};
use crate::{build, output, version, Timer};

/// What a finished run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub completed: Vec<Step>,
    pub skipped: Vec<(Step, String)>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn print(&self) {
        output::detail(&format!(
            "{} step(s) completed, {} skipped in {}",
            self.completed.len(),
            self.skipped.len(),
            crate::format_duration(self.elapsed)
        ));
    }
}

/// Run `steps` in order over `ctx`.
pub fn run(ctx: &mut ReleaseContext, steps: &[Step]) -> Result<RunSummary> {
    let start = Instant::now();

    // Success markers from an earlier run must not survive a failed one,
    // including one that fails before the first step.
    if steps.iter().any(|s| s.is_packaging()) {
        artifact::clear_metadata(&ctx.config)?;
    }

    if steps.iter().any(|s| !s.is_packaging()) {
        PreflightReport {
            checks: check_required_tools(&ctx.config),
            ..Default::default()
        }
        .into_result()?;
    }

    let mut summary = RunSummary::default();
    for (i, step) in steps.iter().enumerate() {
        let label = format!("[{}/{}]", i + 1, steps.len());
        output::step(&label, step.name());

        let timer = Timer::start(step.name());
        match execute(ctx, *step) {
            Ok(StepOutcome::Completed) => {
                timer.finish();
                summary.completed.push(*step);
            }
            Ok(StepOutcome::Skipped { reason }) => {
                output::skip(&format!("[{}]", step), &format!("skipped ({})", reason));
                summary.skipped.push((*step, reason));
            }
            Err(e) => {
                output::fail(&format!("[{}]", step), "failed");
                ctx.discard_outputs();
                return Err(e).with_context(|| format!("Step '{}' failed", step));
            }
        }
    }

    summary.elapsed = start.elapsed();
    Ok(summary)
}

/// Execute a single step.
pub fn execute(ctx: &mut ReleaseContext, step: Step) -> Result<StepOutcome> {
    let config = &ctx.config;

    match step {
        Step::InstallDeps => {
            let performed = DependencyInstaller::new(config).install_all()?;
            if performed == 0 {
                return Ok(StepOutcome::skipped("nothing to install"));
            }
        }

        Step::FormatCheck => {
            if !config.lint {
                return Ok(StepOutcome::skipped("lint disabled"));
            }
            build::fmt_check(config)?;
        }

        Step::Lint => {
            if !config.lint {
                return Ok(StepOutcome::skipped("lint disabled"));
            }
            build::clippy(config)?;
        }

        Step::Build => {
            build::build(config)?;
            let binary = config.binary_path();
            if !binary.is_file() {
                bail!(
                    "cargo build succeeded but {} does not exist.\n\
                     Check BIN_NAME matches a [[bin]] target.",
                    binary.display()
                );
            }
        }

        Step::Test => {
            build::test(config)?;
        }

        Step::ExtractVersion => {
            let found = version::extract_version(&config.binary_path())?;
            output::detail(&format!("Version: {}", found));
            ctx.version = Some(found);
        }

        Step::Archive => {
            let Some(found) = ctx.version.as_deref() else {
                bail!("No version available; extract-version must run before archive");
            };
            let dest = config.archive_path(found);
            artifact::create_archive(&config.binary_path(), &config.executable_name(), &dest)?;
            output::detail(&format!("Archive: {}", dest.display()));
            ctx.record_output(dest.clone());
            ctx.archive = Some(dest);
        }

        Step::WriteMetadata => {
            let (Some(found), Some(archive)) = (ctx.version.clone(), ctx.archive.clone()) else {
                bail!("Nothing to describe; archive must run before write-metadata");
            };
            // Record before writing so a partial write is cleaned up too.
            ctx.record_output(checksum_path(&archive));
            ctx.record_output(ctx.config.version_file());
            ctx.record_output(ctx.config.archive_name_file());

            let metadata = artifact::write_metadata(&ctx.config, &found, &archive)?;
            output::detail(&format!("Version file: {}", metadata.version_file.display()));
            output::detail(&format!(
                "Archive-name file: {}",
                metadata.archive_name_file.display()
            ));
            ctx.metadata = Some(metadata);
        }
    }

    Ok(StepOutcome::Completed)
}

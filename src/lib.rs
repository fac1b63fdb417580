//! relpack - CI and release packaging for Rust binaries.
//!
//! Installs build dependencies, optionally lints, builds and tests a cargo
//! project, then packs the release binary into
//! `<bin>-<version>-<target>.tar.gz` and records the version and archive
//! name in plain-text files for later CI steps.

pub mod artifact;
pub mod build;
pub mod config;
pub mod deps;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod preflight;
pub mod process;
pub mod version;

use std::time::{Duration, Instant};

/// Wall-clock timer for a pipeline phase.
///
/// ```rust,ignore
/// let t = Timer::start("build");
/// build::build(&config)?;
/// t.finish(); // prints "[build] done (42.0s)"
/// ```
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Print the elapsed time and return it.
    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        output::success(
            &format!("[{}]", self.label),
            &format!("done ({})", format_duration(elapsed)),
        );
        elapsed
    }
}

/// `42.0s`, or `1.5m` past a minute.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}

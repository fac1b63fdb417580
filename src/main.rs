//! relpack CLI
//!
//! Runs the CI and release pipeline for a cargo project.
//!
//! # Usage
//!
//! ```bash
//! # Install deps, lint (if enabled), build and test
//! relpack ci
//!
//! # Same, then package tool-<version>-<target>.tar.gz into release/
//! ENABLE_LINT=1 relpack release
//!
//! # Package a binary that is already built
//! relpack package --binary target/x86_64-unknown-linux-gnu/release/tool
//!
//! # Check the host before a long run
//! relpack preflight
//!
//! # Print the version a release would use
//! relpack version
//! ```
//!
//! Every flag has an environment variable counterpart (`--lint` and
//! `ENABLE_LINT`, `--target` and `TARGET`, ...). Flags win.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use relpack::config::{Overrides, ReleaseConfig};
use relpack::pipeline::{self, ReleaseContext, Step};
use relpack::preflight::PreflightChecker;
use relpack::{output, version};

#[derive(Parser)]
#[command(name = "relpack")]
#[command(author, version, about = "CI and release packaging for Rust binaries", long_about = None)]
struct Cli {
    /// Echo every command before running it
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project directory (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Binary to package [env: BIN_NAME]
    #[arg(long = "bin", global = true, value_name = "NAME")]
    bin_name: Option<String>,

    /// Target triple [env: TARGET]
    #[arg(long, global = true, value_name = "TRIPLE")]
    target: Option<String>,

    /// Run fmt and clippy checks [env: ENABLE_LINT]
    #[arg(long, global = true)]
    lint: bool,

    /// Skip fmt and clippy checks even if ENABLE_LINT is set
    #[arg(long, global = true, conflicts_with = "lint")]
    no_lint: bool,

    /// Directory for the archive and metadata files [env: RELEASE_DIR]
    #[arg(long, global = true, value_name = "DIR")]
    release_dir: Option<PathBuf>,

    /// Package this file instead of cargo's build output
    #[arg(long, global = true, value_name = "PATH")]
    binary: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install dependencies, lint, build and test
    Ci,

    /// Run ci, then archive the binary and write release metadata
    Release,

    /// Archive an already built binary and write release metadata
    Package,

    /// Check tools, disk space and network without building anything
    Preflight,

    /// Print the binary's version
    Version,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            project_dir: self.project.clone(),
            bin_name: self.bin_name.clone(),
            target: self.target.clone(),
            lint: match (self.lint, self.no_lint) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
            release_dir: self.release_dir.clone(),
            binary: self.binary.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    output::set_verbose(cli.verbose);

    let result = ReleaseConfig::resolve(cli.overrides()).and_then(|config| match cli.command {
        Commands::Ci => cmd_pipeline("CI", config, pipeline::CI_STEPS),
        Commands::Release => cmd_pipeline("Release", config, pipeline::RELEASE_STEPS),
        Commands::Package => cmd_pipeline("Package", config, pipeline::PACKAGE_STEPS),
        Commands::Preflight => cmd_preflight(&config),
        Commands::Version => cmd_version(&config),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn cmd_pipeline(title: &str, config: ReleaseConfig, steps: &[Step]) -> Result<()> {
    output::banner(&format!("{} Pipeline", title));
    output::detail(&format!("Binary:  {}", config.bin_name));
    output::detail(&format!("Target:  {}", config.target));
    output::detail(&format!(
        "Lint:    {}",
        if config.lint { "enabled" } else { "disabled" }
    ));
    if steps.iter().any(|s| s.is_packaging()) {
        output::detail(&format!("Release: {}", config.release_dir.display()));
    }
    eprintln!();

    let mut ctx = ReleaseContext::new(config);
    let summary = pipeline::run(&mut ctx, steps)?;

    eprintln!();
    output::banner(&format!(
        "{} Complete ({})",
        title,
        relpack::format_duration(summary.elapsed)
    ));
    summary.print();
    if let (Some(version), Some(archive)) = (&ctx.version, &ctx.archive) {
        output::detail(&format!("Version: {}", version));
        output::detail(&format!("Archive: {}", archive.display()));
    }

    Ok(())
}

fn cmd_preflight(config: &ReleaseConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(PreflightChecker::new(config).run_all());

    report.print_summary();
    report.into_result()
}

fn cmd_version(config: &ReleaseConfig) -> Result<()> {
    let found = version::extract_version(&config.binary_path())?;
    println!("{}", found);
    Ok(())
}

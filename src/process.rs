//! External command execution.
//!
//! Every tool the pipeline drives (cargo, rustup, package managers, the
//! packaged binary itself) goes through [`Cmd`]. A non-zero exit is an error
//! unless [`Cmd::allow_fail`] was called, which is what makes the pipeline
//! fail fast.
//!
//! ```rust,ignore
//! use relpack::process::Cmd;
//!
//! let result = Cmd::new("cargo")
//!     .args(["build", "--release"])
//!     .dir(&project)
//!     .error_msg("cargo build failed")
//!     .run_interactive()?;
//! ```

use anyhow::{bail, Context, Result};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::output;

/// Builder for a single external command.
#[derive(Debug, Clone)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    dir: Option<PathBuf>,
    envs: Vec<(OsString, OsString)>,
    error_msg: Option<String>,
    allow_fail: bool,
}

/// Outcome of a finished command.
#[derive(Debug, Clone)]
pub struct CmdResult {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    /// Captured stdout (empty for interactive runs).
    pub stdout: String,
    /// Captured stderr (empty for interactive runs).
    pub stderr: String,
}

impl CmdResult {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl Cmd {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            dir: None,
            envs: Vec::new(),
            error_msg: None,
            allow_fail: false,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn arg_path(self, path: &Path) -> Self {
        self.arg(path.as_os_str())
    }

    /// Run the command in `dir` instead of the current directory.
    pub fn dir(mut self, dir: &Path) -> Self {
        self.dir = Some(dir.to_path_buf());
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Message used in place of the generic failure text.
    pub fn error_msg(mut self, msg: impl Into<String>) -> Self {
        self.error_msg = Some(msg.into());
        self
    }

    /// Return a non-successful [`CmdResult`] instead of an error.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// Run with stdout and stderr captured.
    pub fn run(&self) -> Result<CmdResult> {
        self.echo();
        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to spawn `{}`", self))?;

        let result = CmdResult {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        self.check(result)
    }

    /// Run with stdio inherited so tool output streams to the terminal.
    pub fn run_interactive(&self) -> Result<CmdResult> {
        self.echo();
        let status = self
            .command()
            .status()
            .with_context(|| format!("Failed to spawn `{}`", self))?;

        let result = CmdResult {
            code: status.code(),
            stdout: String::new(),
            stderr: String::new(),
        };
        self.check(result)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    fn echo(&self) {
        if output::is_verbose() {
            output::detail(&format!("$ {}", self));
        }
    }

    fn check(&self, result: CmdResult) -> Result<CmdResult> {
        if result.success() || self.allow_fail {
            return Ok(result);
        }

        let code = match result.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        let stderr = result.stderr.trim();
        let headline = match &self.error_msg {
            Some(msg) => format!("{} ({})", msg, code),
            None => format!("`{}` failed ({})", self, code),
        };

        if stderr.is_empty() {
            bail!("{}", headline);
        }
        bail!("{}\n{}", headline, stderr);
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Resolve a program on `PATH`.
pub fn which(tool: &str) -> Option<String> {
    which::which(tool)
        .ok()
        .map(|path| path.to_string_lossy().into_owned())
}

/// Whether a program is available on `PATH`.
pub fn exists(tool: &str) -> bool {
    which::which(tool).is_ok()
}

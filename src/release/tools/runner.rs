//! Blocking subprocess execution.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::process::Command;

use crate::release::{
    error::{Error, Result},
    pipeline::Stage,
};

/// A single external command.
///
/// Program and arguments are kept as OS strings so paths reach the child
/// process byte for byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    quiet: bool,
}

impl Invocation {
    /// Command with no arguments yet.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            quiet: false,
        }
    }

    /// Command for an executable at `path`.
    pub fn for_path(path: &Path) -> Self {
        Self::new(path)
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Do not echo output (responses parsed by the caller).
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Value following `flag`, e.g. `-exportPath <dir>`. `None` when the
    /// flag is absent or its value is not UTF-8.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .and_then(|v| v.to_str())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program.to_string_lossy())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    fn status_description(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "a signal".to_string(),
        }
    }

    fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (true, _) => self.stderr.clone(),
            (false, true) => self.stdout.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Runs external commands to completion.
pub trait ToolRunner {
    /// Blocks until the command exits. `Err` only when it could not start.
    fn run(&self, invocation: &Invocation) -> std::io::Result<ToolOutput>;
}

impl<T: ToolRunner + ?Sized> ToolRunner for &T {
    fn run(&self, invocation: &Invocation) -> std::io::Result<ToolOutput> {
        (**self).run(invocation)
    }
}

/// [`ToolRunner`] backed by `std::process::Command`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<ToolOutput> {
        log::debug!("Running {}", invocation);

        let output = Command::new(invocation.program())
            .args(invocation.arguments())
            .output()?;

        let result = ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !invocation.is_quiet() {
            for line in result.stdout.lines().chain(result.stderr.lines()) {
                log::debug!("  {}", line);
            }
        }

        Ok(result)
    }
}

/// Runs `invocation` and turns anything but a zero exit into a stage error.
pub fn run_stage<R: ToolRunner + ?Sized>(
    runner: &R,
    stage: Stage,
    invocation: &Invocation,
) -> Result<ToolOutput> {
    let output = runner.run(invocation).map_err(|source| Error::ToolSpawn {
        stage,
        command: invocation.to_string(),
        source,
    })?;

    if !output.is_success() {
        return Err(Error::ToolFailed {
            stage,
            command: invocation.to_string(),
            status: output.status_description(),
            output: output.combined(),
        });
    }

    Ok(output)
}

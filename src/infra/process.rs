//! External process execution
//!
//! Every call to OCB, Go or Docker is described by an [`Invocation`] that
//! carries its own arguments and environment. Nothing here touches the
//! environment of the otelpack process itself.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::error::ProcessError;

/// One external command: program, arguments, extra environment, working dir
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Program name (looked up in PATH) or path
    pub program: PathBuf,
    /// Arguments, passed verbatim
    pub args: Vec<String>,
    /// Variables added on top of the inherited environment
    pub env: Vec<(String, String)>,
    /// Working directory, inherited when `None`
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    /// Start describing a call to `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for this call only
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Run in `dir`
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// File name of the program, for messages
    pub fn program_name(&self) -> String {
        match self.program.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.program.display().to_string(),
        }
    }

    /// Whether `arg` was passed
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Value of an environment variable set on this call
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn to_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null());
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={value} ")?;
        }
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// How a finished process exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
}

impl RunStatus {
    /// A zero exit
    pub const SUCCESS: Self = Self { code: Some(0) };

    /// A non-zero exit with `code`
    pub fn failed(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Whether the process exited with status 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for RunStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Captured result of a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit status
    pub status: RunStatus,
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

impl ProcessOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: RunStatus::SUCCESS,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: RunStatus::failed(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// stdout and stderr joined, for version sniffing
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Runs external commands
///
/// The pipeline only talks to the outside world through this trait, so tests
/// can substitute a recorder.
#[allow(async_fn_in_trait)]
pub trait ProcessRunner {
    /// Run with inherited stdout/stderr and wait for the exit status
    async fn status(&self, invocation: &Invocation) -> Result<RunStatus, ProcessError>;

    /// Run with captured stdout/stderr
    async fn output(&self, invocation: &Invocation) -> Result<ProcessOutput, ProcessError>;

    /// Resolve `program` in PATH
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// [`ProcessRunner`] backed by real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    async fn status(&self, invocation: &Invocation) -> Result<RunStatus, ProcessError> {
        tracing::debug!(command = %invocation, "running");
        let status = invocation
            .to_command()
            .status()
            .await
            .map_err(|e| spawn_error(&invocation.program, &e))?;
        tracing::debug!(program = %invocation.program_name(), %status, "finished");
        Ok(status.into())
    }

    async fn output(&self, invocation: &Invocation) -> Result<ProcessOutput, ProcessError> {
        tracing::debug!(command = %invocation, "running (captured)");
        let output = invocation
            .to_command()
            .output()
            .await
            .map_err(|e| spawn_error(&invocation.program, &e))?;

        Ok(ProcessOutput {
            status: output.status.into(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

fn spawn_error(program: &Path, error: &std::io::Error) -> ProcessError {
    ProcessError::Spawn {
        program: program.display().to_string(),
        error: error.to_string(),
    }
}

//! External process execution
//!
//! Every build step is an [`Invocation`]: a program, its arguments, the
//! directory to run in and the environment changes to apply. The working
//! directory and environment go to the child only; this process never
//! changes its own current directory or environment.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::error::UsageError;

/// A fully described external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    cwd: PathBuf,
    env: BTreeMap<String, OsString>,
    env_remove: Vec<String>,
}

impl Invocation {
    /// Create an invocation of `program` running in `cwd`
    pub fn new(program: impl Into<String>, cwd: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.as_ref().to_path_buf(),
            env: BTreeMap::new(),
            env_remove: Vec::new(),
        }
    }

    /// Add a single argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments, skipping empty ones
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(
            args.into_iter()
                .map(Into::into)
                .filter(|a: &String| !a.is_empty()),
        );
        self
    }

    /// Set an environment variable for the child
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Remove an environment variable for the child
    #[must_use]
    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        self.env_remove.push(key.into());
        self
    }

    /// Program name or path
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Working directory of the child
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Environment variables set for the child
    pub fn get_env(&self) -> &BTreeMap<String, OsString> {
        &self.env
    }

    /// Environment variables removed for the child
    pub fn get_env_remove(&self) -> &[String] {
        &self.env_remove
    }

    /// Shell-like rendering for logs and error messages
    pub fn display_command(&self) -> String {
        let mut s = self.program.clone();
        for arg in &self.args {
            s.push(' ');
            if arg.contains(' ') {
                s.push('"');
                s.push_str(arg);
                s.push('"');
            } else {
                s.push_str(arg);
            }
        }
        s
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.cwd);
        for key in &self.env_remove {
            cmd.env_remove(key);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    code: Option<i32>,
}

impl ProcessExit {
    /// Exit with the given status code
    pub fn code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Successful exit
    pub fn success() -> Self {
        Self::code(0)
    }

    /// Whether the child exited with status zero
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ProcessExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Runs invocations synchronously
pub trait CommandRunner {
    /// Run to completion and report how the child ended
    fn run(&self, invocation: &Invocation) -> std::io::Result<ProcessExit>;
}

/// Runner that spawns real processes with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<ProcessExit> {
        tracing::debug!(
            "Running in {}: {}",
            invocation.cwd().display(),
            invocation.display_command()
        );
        let status = invocation.to_command().status()?;
        Ok(status.into())
    }
}

/// Run an invocation and turn any failure into a message
pub fn run_checked(runner: &dyn CommandRunner, invocation: &Invocation) -> Result<(), String> {
    match runner.run(invocation) {
        Ok(exit) if exit.is_success() => Ok(()),
        Ok(exit) => Err(format!("`{}` failed: {exit}", invocation.display_command())),
        Err(e) => Err(format!(
            "failed to execute `{}`: {e}",
            invocation.display_command()
        )),
    }
}

/// Ensure a host tool is available on PATH
pub fn require_tool(tool: &str) -> Result<PathBuf, UsageError> {
    which::which(tool).map_err(|_| UsageError::MissingTool {
        tool: tool.to_string(),
    })
}

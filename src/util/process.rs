//! Subprocess execution utilities.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

/// Outcome of a finished process: the command line that ran and its exit
/// code. This is all the pipeline observes of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitReport {
    pub command: String,
    /// `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl ExitReport {
    pub fn new(command: impl Into<String>, code: Option<i32>) -> Self {
        ExitReport {
            command: command.into(),
            code,
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    env_clear: bool,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            env_clear: false,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set several environment variables.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (k, v) in vars {
            self.env.insert(k.as_ref().to_string(), v.as_ref().to_string());
        }
        self
    }

    /// Start the child from an empty environment instead of inheriting ours.
    pub fn env_clear(mut self) -> Self {
        self.env_clear = true;
        self
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the explicitly set environment variables.
    pub fn get_envs(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if self.env_clear {
            cmd.env_clear();
        }

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd
    }

    /// Execute with inherited stdio so tool output streams to the terminal.
    pub fn run(&self) -> Result<ExitReport> {
        tracing::debug!("Running `{}`", self.display_command());

        let mut cmd = self.build_command();
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;

        Ok(ExitReport::new(self.display_command(), status.code()))
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}

/// Find CTest, which ships alongside CMake.
pub fn find_ctest() -> Option<PathBuf> {
    if let Some(path) = find_executable("ctest") {
        return Some(path);
    }

    // Fall back to the directory cmake lives in
    let cmake = find_cmake()?;
    let name = if cfg!(windows) { "ctest.exe" } else { "ctest" };
    let candidate = cmake.parent()?.join(name);
    candidate.exists().then_some(candidate)
}

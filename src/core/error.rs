//! Error taxonomy for the packaging pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::target::Linkage;

/// Stage of the native build a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Configure,
    Build,
}

impl std::fmt::Display for BuildStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStage::Configure => f.write_str("configure"),
            BuildStage::Build => f.write_str("build"),
        }
    }
}

/// Errors surfaced to the host by the packaging pipeline.
///
/// None of these are retried. `TestsFailed` is kept apart from `BuildFailed`
/// so a host can choose to package anyway.
#[derive(Debug, Error)]
pub enum PackageError {
    /// Unsupported linkage/build type/platform combination.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The native build tool exited non-zero.
    #[error("{stage} step failed: `{command}` exited with {}", display_code(.code))]
    BuildFailed {
        stage: BuildStage,
        command: String,
        code: Option<i32>,
    },

    /// The test runner exited non-zero.
    #[error("tests failed{}: `{command}` exited with {}",
            display_config(.config),
            display_code(.code))]
    TestsFailed {
        command: String,
        code: Option<i32>,
        config: Option<String>,
    },

    /// No library for the build's linkage ended up in the package.
    #[error("packaging incomplete: no {linkage} library was collected into {}\n\
             help: check that the build produced a library for this linkage", .dir.display())]
    PackagingIncomplete { linkage: Linkage, dir: PathBuf },

    /// Filesystem failure while staging, collecting or publishing.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Failure inside an external collaborator (spawn errors and the like).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PackageError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PackageError::InvalidConfiguration(msg.into())
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        PackageError::Io {
            context: context.into(),
            source,
        }
    }

    /// True for a test-run failure the host may choose to tolerate.
    pub fn is_test_failure(&self) -> bool {
        matches!(self, PackageError::TestsFailed { .. })
    }
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn display_config(config: &Option<String>) -> String {
    config
        .as_ref()
        .map(|c| format!(" ({})", c))
        .unwrap_or_default()
}

/// Attach path context to an `io::Result`, in the manner of `anyhow::Context`.
pub trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> Result<T, PackageError>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T, PackageError>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| PackageError::io(f(), e))
    }
}

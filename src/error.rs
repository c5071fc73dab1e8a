//! Error types for cx_wrapper.
//!
//! Errors are split by the phase in which they occur:
//! - [`ConfigError`]: the wrapper could not be constructed (bad credentials mix, unusable executable)
//! - [`ExecError`]: the external executable could not be run to completion
//! - [`OutputError`]: the executable ran, but its output could not be read or decoded
//!
//! A command that runs and reports failure (non-zero exit, error text on stderr) is not
//! an error at this level. It comes back as a failure-shaped [`CommandOutput`](crate::CommandOutput).

use crate::records::ResultKind;
use std::time::Duration;
use thiserror::Error;

/// Configuration problem detected while building a [`CxConfig`](crate::CxConfig).
///
/// All messages are safe to log (no secrets included).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Both client credentials and an API key were supplied
    #[error("client credentials and api key are mutually exclusive")]
    ConflictingAuthentication,

    /// Executable does not exist
    #[error("executable not found: {path}")]
    ExecutableNotFound { path: String },

    /// Failed to canonicalize or stat the executable path
    #[error("failed to resolve executable {path}: {reason}")]
    ExecutableResolveFailed { path: String, reason: String },

    /// Executable path points to a directory
    #[error("executable path is a directory: {path}")]
    ExecutableIsDirectory { path: String },

    /// Executable is not a regular file
    #[error("executable is not a regular file: {path}")]
    ExecutableNotRegularFile { path: String },

    /// Executable permission bits are missing
    #[error("file is not executable: {path}")]
    NotExecutable { path: String },

    /// Could not set permission bits on the bundled executable
    #[error("failed to update permissions on {path}: {reason}")]
    PermissionUpdateFailed { path: String, reason: String },

    /// No bundled executable location could be determined
    #[error("cannot locate bundled executable: {reason}")]
    BundledExecutableUnavailable { reason: String },
}

/// Failure to run the external executable.
#[derive(Debug, Error)]
pub enum ExecError {
    /// Executable disappeared between construction and launch
    #[error("executable not found at launch: {path}")]
    ExecutableNotFound { path: String },

    /// Failed to spawn the process, or lost its pipes
    #[error("failed to spawn process: {reason}")]
    SpawnFailed { reason: String },

    /// Process exceeded timeout and was killed
    #[error("process timed out after {elapsed:?} (limit: {limit:?})")]
    Timeout { limit: Duration, elapsed: Duration },

    /// Process exceeded stdout limit and was killed
    #[error("stdout limit exceeded: {limit} bytes")]
    StdoutLimitExceeded { limit: usize },

    /// Process exceeded stderr limit and was killed
    #[error("stderr limit exceeded: {limit} bytes")]
    StderrLimitExceeded { limit: usize },
}

/// The executable succeeded but produced output that could not be used.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Output is not valid JSON for the requested record type
    #[error("failed to decode {kind} output: {reason}")]
    Decode {
        kind: ResultKind,
        reason: String,
        /// The undecodable text, kept for diagnosis.
        raw: String,
    },

    /// The executable finished without writing its result file
    #[error("result file was not produced: {path}")]
    MissingResultFile { path: String },

    /// The result file exists but could not be read
    #[error("failed to read result file {path}: {reason}")]
    ResultFileRead { path: String, reason: String },
}

/// Combined error type returned by [`CxWrapper`](crate::CxWrapper) operations.
#[derive(Debug, Error)]
pub enum CxError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

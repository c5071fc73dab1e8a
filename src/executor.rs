//! Process execution.
//!
//! `ProcessExecutor` is the only place in the crate that touches the OS process
//! layer. It spawns the executable directly (no shell), drains stdout and stderr
//! concurrently, and waits for exit.

use crate::command::redact_argv;
use crate::error::ExecError;
use crate::limits::ResourceLimits;
use crate::outcome::CommandOutcome;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs the external executable with a prepared argument vector.
///
/// Cheap to clone. Holds no per-call state, so one executor can serve any number
/// of concurrent calls.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    bin: PathBuf,
    limits: ResourceLimits,
}

impl ProcessExecutor {
    /// Create an executor for the given executable.
    pub fn new(bin: impl Into<PathBuf>, limits: ResourceLimits) -> Self {
        Self {
            bin: bin.into(),
            limits,
        }
    }

    /// Get the executable path.
    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Get the resource limits.
    pub fn limits(&self) -> ResourceLimits {
        self.limits
    }

    /// Run the executable to completion.
    ///
    /// A non-zero exit code is not an error here; it is reported in the
    /// returned [`CommandOutcome`] for the caller to interpret.
    ///
    /// Dropping the returned future kills the child process.
    ///
    /// # Errors
    ///
    /// - `ExecError::ExecutableNotFound` if the executable is gone
    /// - `ExecError::SpawnFailed` if the process couldn't be started or waited on
    /// - `ExecError::Timeout` if the process exceeded the timeout
    /// - `ExecError::StdoutLimitExceeded` / `StderrLimitExceeded` if output exceeded the limits
    pub async fn run(&self, argv: &[String]) -> Result<CommandOutcome, ExecError> {
        let start = Instant::now();
        debug!(bin = %self.bin.display(), argv = ?redact_argv(argv), "running cx command");

        let mut cmd = Command::new(&self.bin);
        cmd.args(argv)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ExecError::ExecutableNotFound {
                path: self.bin.display().to_string(),
            },
            _ => ExecError::SpawnFailed {
                reason: e.to_string(),
            },
        })?;

        let stdout = child.stdout.take().ok_or_else(|| ExecError::SpawnFailed {
            reason: "stdout was not captured".to_string(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| ExecError::SpawnFailed {
            reason: "stderr was not captured".to_string(),
        })?;

        let limits = self.limits;
        let collect = async {
            let (stdout_res, stderr_res) = tokio::join!(
                read_capped(stdout, limits.max_stdout, Stream::Stdout),
                read_capped(stderr, limits.max_stderr, Stream::Stderr),
            );
            let (stdout_buf, stderr_buf) = (stdout_res?, stderr_res?);
            let status = child.wait().await.map_err(|e| ExecError::SpawnFailed {
                reason: format!("wait error: {}", e),
            })?;
            Ok::<_, ExecError>((stdout_buf, stderr_buf, status))
        };

        let result = match limits.timeout {
            Some(limit) => {
                let timed = tokio::time::timeout(limit, collect).await;
                match timed {
                    Ok(result) => result,
                    Err(_) => {
                        let elapsed = start.elapsed();
                        let _ = child.kill().await;
                        warn!(bin = %self.bin.display(), ?elapsed, "cx command timed out");
                        return Err(ExecError::Timeout { limit, elapsed });
                    }
                }
            }
            None => collect.await,
        };

        let (stdout_buf, stderr_buf, status) = match result {
            Ok(collected) => collected,
            Err(error) => {
                let _ = child.kill().await;
                warn!(bin = %self.bin.display(), %error, "cx command aborted");
                return Err(error);
            }
        };

        let exit_code = status.code().unwrap_or(-1);
        debug!(exit_code, elapsed = ?start.elapsed(), "cx command finished");

        Ok(CommandOutcome {
            exit_code,
            stdout: stdout_buf,
            stderr: stderr_buf,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Read a pipe to EOF, failing once more than `max` bytes arrive.
async fn read_capped<R>(mut reader: R, max: usize, stream: Stream) -> Result<Vec<u8>, ExecError>
where
    R: AsyncRead + Unpin,
{
    let mut out = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => return Ok(out), // EOF
            Ok(n) => {
                if out.len() + n > max {
                    return Err(match stream {
                        Stream::Stdout => ExecError::StdoutLimitExceeded { limit: max },
                        Stream::Stderr => ExecError::StderrLimitExceeded { limit: max },
                    });
                }
                out.extend_from_slice(&buf[..n]);
            }
            Err(e) => {
                let name = match stream {
                    Stream::Stdout => "stdout",
                    Stream::Stderr => "stderr",
                };
                return Err(ExecError::SpawnFailed {
                    reason: format!("{} read error: {}", name, e),
                });
            }
        }
    }
}

//! Resource limits for CLI invocations.

use std::time::Duration;

/// Resource limits applied to every invocation of the external executable.
///
/// When a limit is exceeded the child is killed and the call fails with the
/// matching [`ExecError`](crate::ExecError).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Wall-clock timeout for the process.
    ///
    /// Default: none. A blocking `scan create` can legitimately run for a long
    /// time, so callers opt in.
    pub timeout: Option<Duration>,

    /// Maximum bytes to capture from stdout.
    ///
    /// Default: 64 MB.
    pub max_stdout: usize,

    /// Maximum bytes to capture from stderr.
    ///
    /// Default: 4 MB.
    pub max_stderr: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            timeout: None,
            max_stdout: 64 * 1024 * 1024, // 64 MB
            max_stderr: 4 * 1024 * 1024,  // 4 MB
        }
    }
}

impl ResourceLimits {
    /// Set a wall-clock timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set maximum stdout bytes.
    pub fn with_max_stdout(mut self, max: usize) -> Self {
        self.max_stdout = max;
        self
    }

    /// Set maximum stderr bytes.
    pub fn with_max_stderr(mut self, max: usize) -> Self {
        self.max_stderr = max;
        self
    }
}

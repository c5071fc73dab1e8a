//! Commands whose results land in a file instead of stdout.
//!
//! `result show` writes `<output-path>/<output-name><extension>`. The bridge picks
//! a collision-resistant name, waits for the process to exit, reads the file once
//! and removes it. Removal is tied to [`ResultFile`]'s `Drop`, so the file is gone
//! on every path: success, process failure, missing file, read or decode error.

use crate::constants::{FORMAT_JSON, FORMAT_SUMMARY_HTML};
use crate::error::{CxError, OutputError};
use crate::executor::ProcessExecutor;
use crate::interpret::{decode, interpret, is_failure, CommandOutput, CommandResult, Payload};
use crate::records::ResultKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

/// Report formats the bridge knows how to read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Full results document, decoded into [`ScanResults`](crate::ScanResults).
    Json,
    /// HTML summary, returned as text.
    SummaryHtml,
}

impl ReportFormat {
    /// Value for `--report-format`.
    pub fn cli_value(self) -> &'static str {
        match self {
            ReportFormat::Json => FORMAT_JSON,
            ReportFormat::SummaryHtml => FORMAT_SUMMARY_HTML,
        }
    }

    /// Extension the executable appends to `--output-name`.
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => ".json",
            ReportFormat::SummaryHtml => ".html",
        }
    }

    /// Record type of the file contents; `None` for raw text.
    pub fn kind(self) -> Option<ResultKind> {
        match self {
            ReportFormat::Json => Some(ResultKind::Results),
            ReportFormat::SummaryHtml => None,
        }
    }
}

/// A result file the executable is expected to create.
///
/// Removes the file, if present, when dropped.
#[derive(Debug)]
pub struct ResultFile {
    dir: PathBuf,
    base_name: String,
    path: PathBuf,
}

impl ResultFile {
    /// Reserve a fresh name in `dir` for a file with the given extension.
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self::with_base_name(dir, unique_base_name(), extension)
    }

    /// Use a caller-chosen base name.
    pub fn with_base_name(dir: impl Into<PathBuf>, base_name: impl Into<String>, extension: &str) -> Self {
        let dir = dir.into();
        let base_name = base_name.into();
        let path = dir.join(format!("{}{}", base_name, extension));
        Self {
            dir,
            base_name,
            path,
        }
    }

    /// Directory passed as `--output-path`.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Name passed as `--output-name`.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Full path the executable will write.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file.
    ///
    /// # Errors
    ///
    /// - `OutputError::MissingResultFile` if the executable did not create it
    /// - `OutputError::ResultFileRead` for any other read failure
    pub async fn read_to_string(&self) -> Result<String, OutputError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => OutputError::MissingResultFile {
                    path: self.path.display().to_string(),
                },
                _ => OutputError::ResultFileRead {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                },
            })
    }
}

impl Drop for ResultFile {
    fn drop(&mut self) {
        // Drop cannot await; unlinking one small file blocks only briefly.
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed result file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove result file"),
        }
    }
}

/// `<epoch-millis>-<uuid>`: ordered by time, unique within the same millisecond.
pub fn unique_base_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{}-{}", millis, Uuid::new_v4().simple())
}

/// Run a command that writes `file`, then read and interpret the file.
///
/// The process is awaited to completion before the file is touched. If the
/// process reports failure its failure output is returned and the file is not
/// read. `file` is consumed and removed whatever the outcome.
pub async fn run_with_file_output(
    executor: &ProcessExecutor,
    argv: &[String],
    file: ResultFile,
    kind: Option<ResultKind>,
) -> Result<CommandOutput, CxError> {
    let outcome = executor.run(argv).await?;

    if is_failure(&outcome) {
        return Ok(interpret(&outcome, kind)?);
    }

    let contents = file.read_to_string().await?;
    debug!(path = %file.path().display(), bytes = contents.len(), "read result file");

    let payload = match kind {
        Some(kind) => decode(kind, &contents)?,
        None => Payload::Text(contents),
    };

    Ok(CommandOutput {
        exit_code: outcome.exit_code,
        kind,
        result: CommandResult::Success(payload),
    })
}

//! Turning raw process outcomes into typed command outputs.
//!
//! Classification comes first: a run that exited non-zero, or that printed a
//! recognized error line on stderr, is a failure and its diagnostic text is kept
//! verbatim. Only successful runs are decoded, and a decode problem is reported
//! as [`OutputError::Decode`], never folded into a failure output.

use crate::bfl::BflNode;
use crate::error::OutputError;
use crate::outcome::CommandOutcome;
use crate::records::{
    CodeBashingLink, KicsRealtimeResults, LearnMoreDescription, Predicate, Project, ResultKind,
    Scan, ScanResults,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

/// Stderr line prefixes that mark a failed run even when the exit code is 0.
pub const ERROR_MARKERS: &[&str] = &["Error:", "error:"];

/// Decoded payload of a successful command.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `scan create|cancel|show|list`.
    Scans(Vec<Scan>),
    /// `project list|show`.
    Projects(Vec<Project>),
    /// Triage history from `triage show`.
    Predicates(Vec<Predicate>),
    /// Authoritative best-fix-location nodes, as returned by the executable.
    BestFixLocations(Vec<BflNode>),
    /// Best-fix-location lookup resolved against caller nodes.
    BestFixLocation {
        /// Index into the caller's node list, or [`BFL_NOT_FOUND`](crate::BFL_NOT_FOUND).
        index: i64,
        /// Authoritative nodes the index was resolved against.
        nodes: Vec<BflNode>,
    },
    /// Lesson links from `result codebashing`.
    CodeBashing(Vec<CodeBashingLink>),
    /// Findings from `scan kics-realtime`.
    KicsRealtime(KicsRealtimeResults),
    /// Query documentation from `utils learn-more`.
    LearnMore(Vec<LearnMoreDescription>),
    /// Results document read back from a result file.
    Results(ScanResults),
    /// Verbatim stdout (or result file text) for commands without a record type.
    Text(String),
}

/// Success or failure of one command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Decoded output of a successful run.
    Success(Payload),
    /// Diagnostic text from the executable.
    Failure(String),
}

/// Interpreted output of one command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    /// Exit code of the process, `-1` if it was killed by a signal.
    pub exit_code: i32,

    /// The record type that was requested, if any.
    pub kind: Option<ResultKind>,

    /// Decoded payload or failure diagnostic.
    pub result: CommandResult,
}

impl CommandOutput {
    pub fn is_success(&self) -> bool {
        matches!(self.result, CommandResult::Success(_))
    }

    pub fn payload(&self) -> Option<&Payload> {
        match &self.result {
            CommandResult::Success(payload) => Some(payload),
            CommandResult::Failure(_) => None,
        }
    }

    /// Diagnostic text of a failed command.
    pub fn diagnostic(&self) -> Option<&str> {
        match &self.result {
            CommandResult::Failure(text) => Some(text),
            CommandResult::Success(_) => None,
        }
    }

    pub fn scans(&self) -> Option<&[Scan]> {
        match self.payload()? {
            Payload::Scans(scans) => Some(scans),
            _ => None,
        }
    }

    pub fn projects(&self) -> Option<&[Project]> {
        match self.payload()? {
            Payload::Projects(projects) => Some(projects),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self.payload()? {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Resolved best-fix-location index, if this is a lookup output.
    pub fn bfl_index(&self) -> Option<i64> {
        match self.payload()? {
            Payload::BestFixLocation { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Whether a run failed, judging by exit code and stderr.
pub fn is_failure(outcome: &CommandOutcome) -> bool {
    if outcome.exit_code != 0 {
        return true;
    }
    let stderr = outcome.stderr_string();
    stderr.lines().any(|line| {
        let line = line.trim_start();
        ERROR_MARKERS.iter().any(|marker| line.starts_with(marker))
    })
}

/// Interpret a process outcome.
///
/// `kind == None` means the command has no record type and a successful run
/// yields its stdout verbatim.
///
/// # Errors
///
/// `OutputError::Decode` if a successful run's stdout does not decode as `kind`.
pub fn interpret(
    outcome: &CommandOutcome,
    kind: Option<ResultKind>,
) -> Result<CommandOutput, OutputError> {
    if is_failure(outcome) {
        let diagnostic = failure_diagnostic(outcome);
        warn!(exit_code = outcome.exit_code, %diagnostic, "cx command failed");
        return Ok(CommandOutput {
            exit_code: outcome.exit_code,
            kind,
            result: CommandResult::Failure(diagnostic),
        });
    }

    let stdout = outcome.stdout_string();
    let payload = match kind {
        Some(kind) => decode(kind, &stdout)?,
        None => Payload::Text(stdout),
    };

    Ok(CommandOutput {
        exit_code: outcome.exit_code,
        kind,
        result: CommandResult::Success(payload),
    })
}

/// Stderr, or stdout when stderr is blank.
fn failure_diagnostic(outcome: &CommandOutcome) -> String {
    let stderr = outcome.stderr_string();
    if stderr.trim().is_empty() {
        outcome.stdout_string()
    } else {
        stderr
    }
}

/// Decode JSON text into the payload for `kind`.
pub fn decode(kind: ResultKind, text: &str) -> Result<Payload, OutputError> {
    Ok(match kind {
        ResultKind::Scan => Payload::Scans(decode_list(kind, text)?),
        ResultKind::Project => Payload::Projects(decode_list(kind, text)?),
        ResultKind::Predicate => Payload::Predicates(decode_list(kind, text)?),
        ResultKind::BestFixLocation => Payload::BestFixLocations(decode_list(kind, text)?),
        ResultKind::CodeBashing => Payload::CodeBashing(decode_list(kind, text)?),
        ResultKind::LearnMoreDescriptions => Payload::LearnMore(decode_list(kind, text)?),
        ResultKind::KicsRealtime => Payload::KicsRealtime(decode_document(kind, text)?),
        ResultKind::Results => Payload::Results(decode_document(kind, text)?),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// A JSON array, a single object (as a one-element list), or blank (empty list).
fn decode_list<T: DeserializeOwned>(kind: ResultKind, text: &str) -> Result<Vec<T>, OutputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<OneOrMany<T>>(trimmed) {
        Ok(OneOrMany::Many(items)) => Ok(items),
        Ok(OneOrMany::One(item)) => Ok(vec![item]),
        // untagged errors are opaque; retry as a list for a precise message
        Err(_) => serde_json::from_str::<Vec<T>>(trimmed).map_err(|e| decode_error(kind, e, text)),
    }
}

fn decode_document<T: DeserializeOwned>(kind: ResultKind, text: &str) -> Result<T, OutputError> {
    serde_json::from_str(text.trim()).map_err(|e| decode_error(kind, e, text))
}

fn decode_error(kind: ResultKind, error: serde_json::Error, text: &str) -> OutputError {
    OutputError::Decode {
        kind,
        reason: error.to_string(),
        raw: text.to_string(),
    }
}

//! Public entry point: one async method per cx subcommand.
//!
//! Every method is a stateless round trip: build argv, run the executable once,
//! interpret its output. Nothing is cached or retried between calls, and scan
//! progress is observed only by calling [`CxWrapper::scan_show`] again.

use crate::bfl::{find_index_or_sentinel, NodeLocation};
use crate::command::CommandLine;
use crate::config::CxConfig;
use crate::constants::*;
use crate::error::CxError;
use crate::executor::ProcessExecutor;
use crate::interpret::{interpret, CommandOutput, CommandResult, Payload};
use crate::params::ParameterSet;
use crate::records::ResultKind;
use crate::result_file::{run_with_file_output, ReportFormat, ResultFile};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Typed async wrapper around the cx executable.
///
/// Cheap to clone; clones share the same immutable configuration and may be
/// used concurrently. Each call spawns exactly one child process, which is
/// killed if the call's future is dropped.
#[derive(Debug, Clone)]
pub struct CxWrapper {
    config: Arc<CxConfig>,
    executor: ProcessExecutor,
    temp_dir: PathBuf,
}

impl CxWrapper {
    /// Create a wrapper from a built configuration.
    pub fn new(config: CxConfig) -> Self {
        let executor = ProcessExecutor::new(config.executable(), config.limits());
        Self {
            config: Arc::new(config),
            executor,
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Directory for transient result files. Defaults to the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn config(&self) -> &CxConfig {
        &self.config
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    async fn execute(
        &self,
        argv: Vec<String>,
        kind: Option<ResultKind>,
    ) -> Result<CommandOutput, CxError> {
        let outcome = self.executor.run(&argv).await?;
        Ok(interpret(&outcome, kind)?)
    }

    fn command(&self, command: &'static str, subcommand: &'static str) -> CommandLine<'_> {
        CommandLine::new(command, subcommand).connection(&self.config)
    }

    /// `auth validate`: checks the configured credentials. Output is the executable's text.
    pub async fn auth_validate(&self) -> Result<CommandOutput, CxError> {
        let argv = self.command(CMD_AUTH, SUB_CMD_VALIDATE).into_argv();
        self.execute(argv, None).await
    }

    /// `scan create` with the given parameters.
    pub async fn scan_create(&self, params: &ParameterSet) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_SCAN, SUB_CMD_CREATE)
            .format(SCAN_INFO_FORMAT, FORMAT_JSON)
            .params(params)
            .into_argv();
        self.execute(argv, Some(ResultKind::Scan)).await
    }

    pub async fn scan_cancel(&self, scan_id: &str) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_SCAN, SUB_CMD_CANCEL)
            .arg_pair(SCAN_ID, scan_id)
            .into_argv();
        self.execute(argv, Some(ResultKind::Scan)).await
    }

    /// `scan show`. Poll this to follow a scan's status.
    pub async fn scan_show(&self, scan_id: &str) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_SCAN, SUB_CMD_SHOW)
            .arg_pair(SCAN_ID, scan_id)
            .json_format()
            .into_argv();
        self.execute(argv, Some(ResultKind::Scan)).await
    }

    /// `scan list`, optionally filtered, e.g. `"statuses=Completed,limit=10"`.
    pub async fn scan_list(&self, filter: &str) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_SCAN, SUB_CMD_LIST)
            .filter(filter)
            .json_format()
            .into_argv();
        self.execute(argv, Some(ResultKind::Scan)).await
    }

    pub async fn project_list(&self, filter: &str) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_PROJECT, SUB_CMD_LIST)
            .filter(filter)
            .json_format()
            .into_argv();
        self.execute(argv, Some(ResultKind::Project)).await
    }

    pub async fn project_show(&self, project_id: &str) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_PROJECT, SUB_CMD_SHOW)
            .arg_pair(PROJECT_ID, project_id)
            .json_format()
            .into_argv();
        self.execute(argv, Some(ResultKind::Project)).await
    }

    /// `project branches`, filtered by branch name. Output is the executable's text.
    pub async fn project_branches(
        &self,
        project_id: &str,
        name_filter: &str,
    ) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_PROJECT, SUB_CMD_BRANCHES)
            .arg_pair(PROJECT_ID, project_id)
            .filter(&format!("{}{}", BRANCH_NAME_FILTER, name_filter))
            .into_argv();
        self.execute(argv, None).await
    }

    /// `triage show`: the triage history of one finding.
    pub async fn triage_show(
        &self,
        project_id: &str,
        similarity_id: &str,
        scan_type: &str,
    ) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_TRIAGE, SUB_CMD_SHOW)
            .arg_pair(PROJECT_ID, project_id)
            .arg_pair(SIMILARITY_ID, similarity_id)
            .arg_pair(SCAN_TYPE, scan_type)
            .json_format()
            .into_argv();
        self.execute(argv, Some(ResultKind::Predicate)).await
    }

    /// `triage update`. Output is the executable's text.
    pub async fn triage_update(
        &self,
        project_id: &str,
        similarity_id: &str,
        scan_type: &str,
        state: &str,
        comment: &str,
        severity: &str,
    ) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_TRIAGE, SUB_CMD_UPDATE)
            .arg_pair(PROJECT_ID, project_id)
            .arg_pair(SIMILARITY_ID, similarity_id)
            .arg_pair(SCAN_TYPE, scan_type)
            .arg_pair(STATE, state)
            .arg_pair(COMMENT, comment)
            .arg_pair(SEVERITY, severity)
            .into_argv();
        self.execute(argv, None).await
    }

    /// Full results of a scan, decoded into [`ScanResults`](crate::ScanResults).
    pub async fn results_list(&self, scan_id: &str) -> Result<CommandOutput, CxError> {
        self.results_via_file(scan_id, ReportFormat::Json).await
    }

    /// HTML summary of a scan, as text.
    pub async fn results_summary(&self, scan_id: &str) -> Result<CommandOutput, CxError> {
        self.results_via_file(scan_id, ReportFormat::SummaryHtml).await
    }

    async fn results_via_file(
        &self,
        scan_id: &str,
        format: ReportFormat,
    ) -> Result<CommandOutput, CxError> {
        let file = ResultFile::new(&self.temp_dir, format.extension());
        let argv = self.results_show_argv(
            scan_id,
            format.cli_value(),
            file.base_name(),
            &file.dir().display().to_string(),
        );
        debug!(path = %file.path().display(), "expecting result file");
        run_with_file_output(&self.executor, &argv, file, format.kind()).await
    }

    /// `result show` writing a report where the caller asks. The file is left in place.
    pub async fn results_show(
        &self,
        scan_id: &str,
        report_format: &str,
        output_name: &str,
        output_path: &str,
    ) -> Result<CommandOutput, CxError> {
        let argv = self.results_show_argv(scan_id, report_format, output_name, output_path);
        self.execute(argv, None).await
    }

    fn results_show_argv(
        &self,
        scan_id: &str,
        report_format: &str,
        output_name: &str,
        output_path: &str,
    ) -> Vec<String> {
        self.command(CMD_RESULT, SUB_CMD_SHOW)
            .arg_pair(SCAN_ID, scan_id)
            .arg_pair(REPORT_FORMAT, report_format)
            .arg_pair_if_present(OUTPUT_NAME, output_name)
            .arg_pair_if_present(OUTPUT_PATH, output_path)
            .into_argv()
    }

    /// Codebashing lesson links for a vulnerability type.
    pub async fn code_bashing_list(
        &self,
        cwe_id: &str,
        language: &str,
        query_name: &str,
    ) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_RESULT, SUB_CMD_CODE_BASHING)
            .arg_pair(LANGUAGE, language)
            .arg_pair(VULNERABILITY_TYPE, query_name)
            .arg_pair(CWE_ID, cwe_id)
            .json_format()
            .into_argv();
        self.execute(argv, Some(ResultKind::CodeBashing)).await
    }

    /// Best fix location for a query, as an index into `result_nodes`.
    ///
    /// On success the payload is [`Payload::BestFixLocation`] with `index` set to
    /// the position of the first of `result_nodes` matching an authoritative node,
    /// or [`BFL_NOT_FOUND`](crate::BFL_NOT_FOUND).
    pub async fn results_bfl<N: NodeLocation>(
        &self,
        scan_id: &str,
        query_id: &str,
        result_nodes: &[N],
    ) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_RESULT, SUB_CMD_BFL)
            .arg_pair(SCAN_ID, scan_id)
            .arg_pair(QUERY_ID, query_id)
            .json_format()
            .into_argv();
        let output = self.execute(argv, Some(ResultKind::BestFixLocation)).await?;

        let result = match output.result {
            CommandResult::Success(Payload::BestFixLocations(nodes)) => {
                let index = find_index_or_sentinel(&nodes, result_nodes);
                debug!(index, candidates = result_nodes.len(), "resolved best fix location");
                CommandResult::Success(Payload::BestFixLocation { index, nodes })
            }
            other => other,
        };
        Ok(CommandOutput { result, ..output })
    }

    /// `scan kics-realtime` over local files.
    ///
    /// `additional_params` is passed as a single `--additional-params` value.
    /// `engine` is omitted when empty. Drop the future to stop the scan.
    pub async fn kics_realtime_scan(
        &self,
        file_sources: &str,
        engine: &str,
        additional_params: &str,
    ) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_SCAN, SUB_CMD_KICS_REALTIME)
            .arg_pair(FILE_SOURCES, file_sources)
            .arg_pair(ADDITIONAL_PARAMS, additional_params)
            .arg_pair_if_present(ENGINE, engine)
            .into_argv();
        self.execute(argv, Some(ResultKind::KicsRealtime)).await
    }

    /// Query documentation and samples.
    pub async fn learn_more(&self, query_id: &str) -> Result<CommandOutput, CxError> {
        let argv = self
            .command(CMD_UTILS, SUB_CMD_LEARN_MORE)
            .arg_pair(QUERY_ID, query_id)
            .json_format()
            .into_argv();
        self.execute(argv, Some(ResultKind::LearnMoreDescriptions)).await
    }
}

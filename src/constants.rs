//! Command, subcommand and flag spellings understood by the cx executable.

// Commands
pub const CMD_AUTH: &str = "auth";
pub const CMD_SCAN: &str = "scan";
pub const CMD_PROJECT: &str = "project";
pub const CMD_RESULT: &str = "result";
pub const CMD_TRIAGE: &str = "triage";
pub const CMD_UTILS: &str = "utils";

// Subcommands
pub const SUB_CMD_VALIDATE: &str = "validate";
pub const SUB_CMD_CREATE: &str = "create";
pub const SUB_CMD_CANCEL: &str = "cancel";
pub const SUB_CMD_SHOW: &str = "show";
pub const SUB_CMD_LIST: &str = "list";
pub const SUB_CMD_BRANCHES: &str = "branches";
pub const SUB_CMD_UPDATE: &str = "update";
pub const SUB_CMD_BFL: &str = "bfl";
pub const SUB_CMD_CODE_BASHING: &str = "codebashing";
pub const SUB_CMD_KICS_REALTIME: &str = "kics-realtime";
pub const SUB_CMD_LEARN_MORE: &str = "learn-more";

// Connection flags
pub const CLIENT_ID: &str = "--client-id";
pub const CLIENT_SECRET: &str = "--client-secret";
pub const API_KEY: &str = "--apikey";
pub const BASE_URI: &str = "--base-uri";
pub const BASE_AUTH_URI: &str = "--base-auth-uri";
pub const TENANT: &str = "--tenant";

// Output formats
pub const FORMAT: &str = "--format";
pub const SCAN_INFO_FORMAT: &str = "--scan-info-format";
pub const FORMAT_JSON: &str = "json";
pub const FORMAT_SUMMARY_HTML: &str = "summaryHTML";
pub const REPORT_FORMAT: &str = "--report-format";
pub const OUTPUT_NAME: &str = "--output-name";
pub const OUTPUT_PATH: &str = "--output-path";

// Call-specific flags
pub const FILTER: &str = "--filter";
pub const BRANCH_NAME_FILTER: &str = "branch-name=";
pub const SCAN_ID: &str = "--scan-id";
pub const PROJECT_ID: &str = "--project-id";
pub const SIMILARITY_ID: &str = "--similarity-id";
pub const SCAN_TYPE: &str = "--scan-type";
pub const STATE: &str = "--state";
pub const COMMENT: &str = "--comment";
pub const SEVERITY: &str = "--severity";
pub const QUERY_ID: &str = "--query-id";
pub const LANGUAGE: &str = "--language";
pub const VULNERABILITY_TYPE: &str = "--vulnerability-type";
pub const CWE_ID: &str = "--cwe-id";
pub const FILE_SOURCES: &str = "--file-sources";
pub const ADDITIONAL_PARAMS: &str = "--additional-params";
pub const ENGINE: &str = "--engine";

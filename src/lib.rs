//! # cx_wrapper
//!
//! Typed async wrapper around the Checkmarx One `cx` command-line executable.
//!
//! `cx_wrapper` does no analysis itself. It builds argument vectors for a fixed set
//! of `cx` subcommands, runs the executable as a child process, classifies the run
//! as success or failure, and decodes JSON output into typed records.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cx_wrapper::{CxConfig, CxWrapper, ParamKind, ParameterSet};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CxConfig::builder()
//!     .api_key(std::env::var("CX_APIKEY")?)
//!     .base_uri("https://ast.checkmarx.net")
//!     .executable("/opt/cx/cx")
//!     .build()?;
//! let cx = CxWrapper::new(config);
//!
//! let params = ParameterSet::new()
//!     .with(ParamKind::ProjectName, "my-service")
//!     .with(ParamKind::ScanTypes, "sast")
//!     .with(ParamKind::Source, ".")
//!     .with(ParamKind::AdditionalParameters, "--async");
//! let created = cx.scan_create(&params).await?;
//!
//! if let Some(scan) = created.scans().and_then(|s| s.first()) {
//!     let shown = cx.scan_show(&scan.id).await?;
//!     println!("status: {:?}", shown.scans().map(|s| s[0].status.clone()));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Principles
//!
//! - **No shell interpretation**: argv goes straight to the executable
//! - **Stateless calls**: one child process per call, no retries, no caching
//! - **Failures are data**: a failed `cx` run is a [`CommandOutput`] carrying the
//!   diagnostic text; only launch, limit and decode problems are `Err`
//! - **Cancellation kills**: dropping a call's future kills its child process
//!
//! ## Logging
//!
//! Uses `tracing`. Argument vectors are logged at `debug` with secrets masked.
//! Install a subscriber in the application to see them.

mod bfl;
mod command;
mod config;
pub mod constants;
mod error;
mod executable;
mod executor;
mod interpret;
mod limits;
mod outcome;
mod params;
mod records;
mod result_file;
mod wrapper;

// Public API
pub use bfl::{find_index, find_index_or_sentinel, BflNode, NodeKey, NodeLocation, BFL_NOT_FOUND};
pub use command::{connection_arguments, filter_arguments, redact_argv, CommandLine};
pub use config::{Authentication, CxConfig, CxConfigBuilder};
pub use error::{ConfigError, CxError, ExecError, OutputError};
pub use executable::BUNDLED_EXECUTABLE;
pub use executor::ProcessExecutor;
pub use interpret::{decode, interpret, is_failure, CommandOutput, CommandResult, Payload, ERROR_MARKERS};
pub use limits::ResourceLimits;
pub use outcome::CommandOutcome;
pub use params::{tokenize_additional, FlagRule, ParamKind, ParameterSet};
pub use records::{
    CodeBashingLink, KicsFileLocation, KicsQueryResult, KicsRealtimeResults, LearnMoreDescription,
    LearnMoreSample, Predicate, Project, ResultData, ResultKind, ResultNode, Scan, ScanResult,
    ScanResults, StatusDetail,
};
pub use result_file::{run_with_file_output, unique_base_name, ReportFormat, ResultFile};
pub use wrapper::CxWrapper;

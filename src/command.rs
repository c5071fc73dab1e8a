//! Argument vector assembly.
//!
//! `CommandLine` turns a subcommand profile, the wrapper configuration and the
//! per-call parameters into the argv handed to the executable. Pure: no I/O, and
//! neither the configuration nor the parameters are modified.
//!
//! Sections are always emitted in the same order, whatever order the builder
//! methods are called in:
//!
//! 1. `<command> <subcommand>`
//! 2. fixed call-specific arguments (ids, filters)
//! 3. connection flags (credentials, base URIs, tenant)
//! 4. output format
//! 5. the parameter set

use crate::config::{Authentication, CxConfig};
use crate::constants::{
    API_KEY, BASE_AUTH_URI, BASE_URI, CLIENT_ID, CLIENT_SECRET, FILTER, FORMAT, FORMAT_JSON,
    TENANT,
};
use crate::params::ParameterSet;

/// Builder for one invocation's argv.
#[derive(Debug, Clone)]
pub struct CommandLine<'a> {
    command: &'static str,
    subcommand: &'static str,
    fixed: Vec<String>,
    connection: Option<&'a CxConfig>,
    format: Option<(&'static str, &'static str)>,
    params: Option<&'a ParameterSet>,
}

impl<'a> CommandLine<'a> {
    /// Start a command line with `<command> <subcommand>`.
    pub fn new(command: &'static str, subcommand: &'static str) -> Self {
        Self {
            command,
            subcommand,
            fixed: Vec::new(),
            connection: None,
            format: None,
            params: None,
        }
    }

    /// Append a fixed flag and its value.
    pub fn arg_pair(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.fixed.push(flag.to_string());
        self.fixed.push(value.into());
        self
    }

    /// Append a flag and its value only when the value is non-empty.
    pub fn arg_pair_if_present(self, flag: &str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.arg_pair(flag, value)
        }
    }

    /// Append a `--filter` pair when the filter is non-empty.
    pub fn filter(mut self, filter: &str) -> Self {
        self.fixed.extend(filter_arguments(filter));
        self
    }

    /// Include credentials, endpoints and tenant from the configuration.
    pub fn connection(mut self, config: &'a CxConfig) -> Self {
        self.connection = Some(config);
        self
    }

    /// Request `--format json`.
    pub fn json_format(self) -> Self {
        self.format(FORMAT, FORMAT_JSON)
    }

    /// Request a format through a command-specific flag, e.g. `--scan-info-format`.
    pub fn format(mut self, flag: &'static str, value: &'static str) -> Self {
        self.format = Some((flag, value));
        self
    }

    /// Append the rendered parameter set.
    pub fn params(mut self, params: &'a ParameterSet) -> Self {
        self.params = Some(params);
        self
    }

    /// Produce the final argv.
    pub fn into_argv(self) -> Vec<String> {
        let mut argv = vec![self.command.to_string(), self.subcommand.to_string()];
        argv.extend(self.fixed);
        if let Some(config) = self.connection {
            argv.extend(connection_arguments(config));
        }
        if let Some((flag, value)) = self.format {
            argv.push(flag.to_string());
            argv.push(value.to_string());
        }
        if let Some(params) = self.params {
            argv.extend(params.to_args());
        }
        argv
    }
}

/// Connection flags in their fixed order: credentials, base URI, base auth URI, tenant.
pub fn connection_arguments(config: &CxConfig) -> Vec<String> {
    let mut args = Vec::new();
    match config.auth() {
        Some(Authentication::ClientCredentials {
            client_id,
            client_secret,
        }) => {
            args.push(CLIENT_ID.to_string());
            args.push(client_id.clone());
            args.push(CLIENT_SECRET.to_string());
            args.push(client_secret.clone());
        }
        Some(Authentication::ApiKey(key)) => {
            args.push(API_KEY.to_string());
            args.push(key.clone());
        }
        None => {}
    }
    for (flag, value) in [
        (BASE_URI, config.base_uri()),
        (BASE_AUTH_URI, config.base_auth_uri()),
        (TENANT, config.tenant()),
    ] {
        if let Some(value) = value {
            args.push(flag.to_string());
            args.push(value.to_string());
        }
    }
    args
}

/// Wrap a free-text filter as `--filter <value>`; an empty filter yields nothing.
pub fn filter_arguments(filter: &str) -> Vec<String> {
    if filter.is_empty() {
        Vec::new()
    } else {
        vec![FILTER.to_string(), filter.to_string()]
    }
}

/// Copy of `argv` safe to log: values following secret-bearing flags are masked.
pub fn redact_argv(argv: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(argv.len());
    let mut mask_next = false;
    for arg in argv {
        if mask_next {
            out.push("***".to_string());
            mask_next = false;
            continue;
        }
        match arg.split_once('=') {
            Some((flag, _)) if is_secret_flag(flag) => out.push(format!("{}=***", flag)),
            _ => {
                mask_next = is_secret_flag(arg);
                out.push(arg.clone());
            }
        }
    }
    out
}

fn is_secret_flag(flag: &str) -> bool {
    flag == CLIENT_SECRET || flag == API_KEY
}

//! Wrapper configuration.
//!
//! `CxConfig` is built once per wrapper and never changes afterwards. It holds
//! the authentication mode, the server endpoints and the resolved executable.

use crate::error::ConfigError;
use crate::executable::{default_resources_dir, mark_executable, resolve_executable, BUNDLED_EXECUTABLE};
use crate::limits::ResourceLimits;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// How the cx executable authenticates against the server.
#[derive(Clone, PartialEq, Eq)]
pub enum Authentication {
    /// OAuth client credentials.
    ClientCredentials { client_id: String, client_secret: String },
    /// API key.
    ApiKey(String),
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authentication::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"***")
                .finish(),
            Authentication::ApiKey(_) => f.debug_tuple("ApiKey").field(&"***").finish(),
        }
    }
}

/// Immutable wrapper configuration.
///
/// Create using `CxConfig::builder()`.
#[derive(Debug, Clone)]
pub struct CxConfig {
    /// Authentication mode. `None` lets the executable fall back to its own stored credentials.
    auth: Option<Authentication>,

    base_uri: Option<String>,

    base_auth_uri: Option<String>,

    tenant: Option<String>,

    /// Canonicalized path to the cx executable.
    executable: PathBuf,

    limits: ResourceLimits,
}

impl CxConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CxConfigBuilder {
        CxConfigBuilder::new()
    }

    pub fn auth(&self) -> Option<&Authentication> {
        self.auth.as_ref()
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    pub fn base_auth_uri(&self) -> Option<&str> {
        self.base_auth_uri.as_deref()
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// Get the resolved executable path.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn limits(&self) -> ResourceLimits {
        self.limits
    }
}

/// Builder for `CxConfig`.
///
/// Not `Debug`: it holds secrets in plain form until `build()`.
#[derive(Clone, Default)]
pub struct CxConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    api_key: Option<String>,
    base_uri: Option<String>,
    base_auth_uri: Option<String>,
    tenant: Option<String>,
    executable: Option<PathBuf>,
    resources_dir: Option<PathBuf>,
    limits: ResourceLimits,
}

impl CxConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a builder from `CX_*` environment variables.
    ///
    /// Reads `CX_CLIENT_ID`, `CX_CLIENT_SECRET`, `CX_APIKEY`, `CX_BASE_URI`,
    /// `CX_BASE_AUTH_URI`, `CX_TENANT` and `CX_PATH_TO_EXECUTABLE`. Unset and
    /// empty variables are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            client_id: var("CX_CLIENT_ID"),
            client_secret: var("CX_CLIENT_SECRET"),
            api_key: var("CX_APIKEY"),
            base_uri: var("CX_BASE_URI"),
            base_auth_uri: var("CX_BASE_AUTH_URI"),
            tenant: var("CX_TENANT"),
            executable: var("CX_PATH_TO_EXECUTABLE").map(PathBuf::from),
            ..Self::default()
        }
    }

    /// Authenticate with OAuth client credentials.
    pub fn client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Authenticate with an API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = Some(uri.into());
        self
    }

    pub fn base_auth_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_auth_uri = Some(uri.into());
        self
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Use an explicit executable instead of the bundled one.
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Directory holding the bundled executable.
    ///
    /// Ignored when `executable()` is set.
    pub fn resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = Some(dir.into());
        self
    }

    /// Set the timeout applied to each invocation.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.limits.timeout = Some(timeout);
        self
    }

    /// Set resource limits.
    pub fn limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Both client credentials and an API key are set
    /// - The executable cannot be located, or is not an executable regular file
    pub fn build(self) -> Result<CxConfig, ConfigError> {
        let client_credentials = match (self.client_id, self.client_secret) {
            (Some(client_id), Some(client_secret))
                if !client_id.is_empty() && !client_secret.is_empty() =>
            {
                Some(Authentication::ClientCredentials {
                    client_id,
                    client_secret,
                })
            }
            _ => None,
        };
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .map(Authentication::ApiKey);

        let auth = match (client_credentials, api_key) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingAuthentication),
            (Some(creds), None) => {
                info!("received client id and client secret");
                Some(creds)
            }
            (None, Some(key)) => Some(key),
            (None, None) => {
                info!("no client credentials or api key configured");
                None
            }
        };

        let executable = match self.executable {
            Some(path) => resolve_executable(&path)?,
            None => {
                let dir = match self.resources_dir {
                    Some(dir) => dir,
                    None => default_resources_dir()?,
                };
                let bundled = dir.join(BUNDLED_EXECUTABLE);
                mark_executable(&bundled)?;
                resolve_executable(&bundled)?
            }
        };

        Ok(CxConfig {
            auth,
            base_uri: self.base_uri.filter(|v| !v.is_empty()),
            base_auth_uri: self.base_auth_uri.filter(|v| !v.is_empty()),
            tenant: self.tenant.filter(|v| !v.is_empty()),
            executable,
            limits: self.limits,
        })
    }
}

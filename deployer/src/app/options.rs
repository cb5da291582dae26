//! Deployment configuration options

use std::fmt;

use secrecy::SecretString;
use url::Url;

use crate::errors::DeployerError;
use crate::http::documents::DEFAULT_COMPILE_FLAGS;

/// Everything one deployment run needs, fixed at start-up
#[derive(Debug)]
pub struct DeploymentRequest {
    /// IRIS server address
    pub server: ServerOptions,

    /// REST API location
    pub api: ApiOptions,

    /// Basic authentication credentials
    pub credentials: Credentials,

    /// Compiler flags passed to the batch compile
    pub compilation_flags: String,

    /// Prefix removed from local paths to build document names
    pub source_path: String,

    /// Files to upload, in order
    pub changed_files: Vec<String>,

    /// Files to delete
    pub deleted_files: Vec<String>,

    /// Per-request timeout in seconds, none when unset or 0
    pub timeout_secs: Option<u64>,
}

impl DeploymentRequest {
    /// Base URL of the namespace, always ending with `/`
    pub fn namespace_url(&self) -> Result<Url, DeployerError> {
        if self.server.host.trim().is_empty() {
            return Err(DeployerError::ConfigError("host is empty".to_string()));
        }
        if self.api.namespace.trim().is_empty() {
            return Err(DeployerError::ConfigError("namespace is empty".to_string()));
        }

        let mut url = Url::parse(&format!(
            "{}://{}:{}/",
            self.server.scheme, self.server.host, self.server.port
        ))?;

        let segments = self
            .api
            .base_url
            .split('/')
            .chain(std::iter::once(self.api.version.as_str()))
            .chain(std::iter::once(self.api.namespace.as_str()))
            .filter(|segment| !segment.is_empty());

        url.path_segments_mut()
            .map_err(|_| DeployerError::ConfigError("server URL cannot be a base".to_string()))?
            .clear()
            .extend(segments)
            .push("");

        Ok(url)
    }
}

/// Transport scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    /// Parse the CI style flag (`0`/`1`, `true`/`false`, `yes`/`no`)
    pub fn from_flag(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "" | "0" | "false" | "no" | "http" => Ok(Scheme::Http),
            "1" | "true" | "yes" | "https" => Ok(Scheme::Https),
            other => Err(format!("Invalid https flag: {}", other)),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => f.write_str("http"),
            Scheme::Https => f.write_str("https"),
        }
    }
}

/// IRIS server address
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host name or IP
    pub host: String,

    /// Web server port
    pub port: u16,

    /// Transport scheme
    pub scheme: Scheme,
}

/// REST API location
#[derive(Debug, Clone)]
pub struct ApiOptions {
    /// Base path of the API, e.g. `/api/atelier/`
    pub base_url: String,

    /// API version, e.g. `v2`
    pub version: String,

    /// IRIS namespace holding the documents
    pub namespace: String,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            base_url: "/api/atelier/".to_string(),
            version: "v2".to_string(),
            namespace: "USER".to_string(),
        }
    }
}

/// Basic authentication credentials
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Split a comma separated file list, dropping blank entries
pub fn parse_file_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compile flags, falling back to the default when unset
pub fn compile_flags_or_default(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(flags) if !flags.is_empty() => flags.to_string(),
        _ => DEFAULT_COMPILE_FLAGS.to_string(),
    }
}
